//! `emulsion-curves` library crate.
//!
//! The binary (`emul`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit, curve and controller pieces can be driven by other front-ends

pub mod app;
pub mod cli;
pub mod curve;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
