//! Terminal plotting of predicted curves.

pub mod ascii;

pub use ascii::*;
