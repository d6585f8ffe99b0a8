//! Logistic model evaluation.
//!
//! Kept as small, pure functions so the fitter and the curve generator stay
//! independent of each other.

pub mod model;

pub use model::*;
