//! Prediction curve generation: a stoichiometry grid evaluated at one buffer volume.

pub mod generator;
pub mod grid;

pub use generator::*;
pub use grid::*;
