//! Logistic regression fitting.
//!
//! Responsibilities:
//!
//! - Newton-Raphson maximum-likelihood estimation over all observations
//! - convergence / separation detection
//! - fit diagnostics (`FitReport`)

pub mod fitter;

pub use fitter::*;
