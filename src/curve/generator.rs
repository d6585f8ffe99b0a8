//! Predicted-probability curves.
//!
//! For a buffer volume `b` and each grid value `x`:
//!
//! ```text
//! p(x) = sigmoid(β0 + β1·x + β2·b)
//! ```
//!
//! The buffer is deliberately not validated: out-of-range values simply shift
//! the curve.

use crate::domain::{Curve, FittedModel, GridSpec, PredictionPoint};
use crate::error::AppError;

/// Evaluate `model` over a validated grid.
pub fn predict_curve(model: &FittedModel, buffer: f64, grid: &GridSpec) -> Curve {
    let points = grid
        .values()
        .into_iter()
        .map(|x| PredictionPoint {
            stoichiometry: x,
            probability: model.probability(x, buffer),
        })
        .collect();

    Curve { buffer, points }
}

/// Validate `[lo, hi]` / `count` and evaluate `model` over it.
pub fn predict_curve_in_range(
    model: &FittedModel,
    buffer: f64,
    lo: f64,
    hi: f64,
    count: usize,
) -> Result<Curve, AppError> {
    let grid = GridSpec::new(lo, hi, count)?;
    Ok(predict_curve(model, buffer, &grid))
}
