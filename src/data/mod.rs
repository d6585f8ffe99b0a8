//! Observation data: expansion of aggregated trials and synthetic samples.

pub mod expand;
pub mod sample;

pub use expand::*;
pub use sample::*;
