//! Input/output helpers.
//!
//! - CSV ingest of aggregated trials (`ingest`)
//! - curve JSON export (`curve`)

pub mod curve;
pub mod ingest;

pub use curve::*;
pub use ingest::*;
