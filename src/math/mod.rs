//! Mathematical utilities: stable logistic functions and the Newton step solver.

pub mod logistic;
pub mod solve;

pub use logistic::*;
pub use solve::*;
