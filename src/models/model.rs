//! Evaluation of the two-covariate logistic model.
//!
//! The fitter and the curve generator share two primitive operations:
//! - build a design row `[1, stoichiometry, buffer]` (for the Newton step)
//! - map a covariate pair to log-odds and probability (for curves and likelihood)

use crate::domain::FittedModel;
use crate::math::sigmoid;

/// Number of coefficients (intercept, stoichiometry, buffer).
pub const N_COEF: usize = 3;

/// Design row for one observation. The intercept term comes first.
pub fn design_row(stoichiometry: f64, buffer: f64) -> [f64; N_COEF] {
    [1.0, stoichiometry, buffer]
}

/// Linear predictor `β0 + β1·x + β2·b` for raw coefficients.
pub fn linear_predictor(beta: &[f64; N_COEF], stoichiometry: f64, buffer: f64) -> f64 {
    let row = design_row(stoichiometry, buffer);
    beta.iter().zip(row.iter()).map(|(b, x)| b * x).sum()
}

impl FittedModel {
    /// Log-odds of no emulsion at the given covariates.
    pub fn log_odds(&self, stoichiometry: f64, buffer: f64) -> f64 {
        linear_predictor(&self.coefficients(), stoichiometry, buffer)
    }

    /// Probability of no emulsion at the given covariates.
    pub fn probability(&self, stoichiometry: f64, buffer: f64) -> f64 {
        sigmoid(self.log_odds(stoichiometry, buffer))
    }
}
