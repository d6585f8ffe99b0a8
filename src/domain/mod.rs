//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input rows and expanded observations (`AggregatedTrial`, `Observation`)
//! - fit outputs (`FittedModel`, `FitReport`)
//! - prediction outputs (`Curve`, `PredictionPoint`, `GridSpec`)
//! - run configuration (`AppConfig`)

pub mod types;

pub use types::*;
