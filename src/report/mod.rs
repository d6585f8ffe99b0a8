//! Reporting utilities: fit summaries and curve tables.

pub mod format;

pub use format::*;
