//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during expansion, fitting and curve generation
//! - exported to JSON for an external chart renderer
//! - printed in terminal summaries

use std::path::PathBuf;

use serde::Serialize;

use crate::curve::{DEFAULT_LO, DEFAULT_POINTS};

/// Chart title handed to renderers alongside every curve.
pub const CURVE_TITLE: &str = "Prediction of likelihood of not having an emulsion";
/// X-axis label (reagent stoichiometric ratio).
pub const X_LABEL: &str = "K3PO4 stoichiometry";
/// Y-axis label (predicted probability).
pub const Y_LABEL: &str = "Likelihood of no emulsion";

/// One row of source data: a trial condition and its aggregated outcome counts.
///
/// Counts are signed on purpose: rows arrive from an external loader and the
/// expander is responsible for rejecting negative or inconsistent counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregatedTrial {
    /// Reagent (K3PO4) stoichiometric ratio.
    pub stoichiometry: f64,
    /// Buffer volume.
    pub buffer: f64,
    /// Number of trials run at this condition.
    pub total: i64,
    /// Number of those trials that did **not** form an emulsion.
    pub successful: i64,
}

/// Binary outcome of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// An emulsion formed (encoded as 0).
    Emulsion,
    /// No emulsion formed (encoded as 1).
    NoEmulsion,
}

impl Outcome {
    /// Numeric encoding used by the likelihood: 1 for no emulsion, 0 otherwise.
    pub fn value(self) -> f64 {
        match self {
            Outcome::Emulsion => 0.0,
            Outcome::NoEmulsion => 1.0,
        }
    }
}

/// One expanded binary record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub stoichiometry: f64,
    pub buffer: f64,
    pub outcome: Outcome,
}

/// Coefficients of `logit(P(no emulsion)) = β0 + β1·stoichiometry + β2·buffer`.
///
/// Fields are private: a model is produced once by the fitter and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedModel {
    intercept: f64,
    stoichiometry: f64,
    buffer: f64,
}

impl FittedModel {
    pub fn new(intercept: f64, stoichiometry: f64, buffer: f64) -> Self {
        Self {
            intercept,
            stoichiometry,
            buffer,
        }
    }

    /// β0.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// β1, the stoichiometry weight.
    pub fn stoichiometry_weight(&self) -> f64 {
        self.stoichiometry
    }

    /// β2, the buffer weight.
    pub fn buffer_weight(&self) -> f64 {
        self.buffer
    }

    /// Coefficients in design-row order `[β0, β1, β2]`.
    pub fn coefficients(&self) -> [f64; 3] {
        [self.intercept, self.stoichiometry, self.buffer]
    }
}

/// Fit diagnostics reported next to the model.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub model: FittedModel,
    /// Newton iterations performed until convergence.
    pub iterations: usize,
    /// Log-likelihood at the fitted coefficients.
    pub log_likelihood: f64,
    /// Log-likelihood of the intercept-only model.
    pub null_log_likelihood: f64,
    pub n_obs: usize,
    pub n_success: usize,
}

impl FitReport {
    /// McFadden's pseudo-R²: `1 - ll / ll_null`.
    ///
    /// Returns 0 when the null log-likelihood is 0 (all outcomes identical).
    pub fn pseudo_r2(&self) -> f64 {
        if self.null_log_likelihood == 0.0 {
            return 0.0;
        }
        1.0 - self.log_likelihood / self.null_log_likelihood
    }
}

/// Summary stats about the expanded observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_obs: usize,
    pub n_success: usize,
    pub stoichiometry_min: f64,
    pub stoichiometry_max: f64,
    pub buffer_min: f64,
    pub buffer_max: f64,
}

/// One point on a predicted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub stoichiometry: f64,
    /// Predicted probability of no emulsion, in `[0, 1]`.
    pub probability: f64,
}

/// Predicted probabilities over a stoichiometry grid at a fixed buffer volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub buffer: f64,
    /// Points in ascending stoichiometry order.
    pub points: Vec<PredictionPoint>,
}

impl Curve {
    /// `(x, y)` pairs, the shape chart backends consume.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.stoichiometry, p.probability))
            .collect()
    }
}

/// A curve ready for a chart renderer: series plus title and axis labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveFrame {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub curve: Curve,
}

impl CurveFrame {
    pub fn new(curve: Curve) -> Self {
        Self {
            title: CURVE_TITLE,
            x_label: X_LABEL,
            y_label: Y_LABEL,
            curve,
        }
    }
}

/// A saved curve file (JSON). The model is included for reference only and is
/// never read back.
#[derive(Debug, Clone, Serialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: String,
    pub model: FittedModel,
    #[serde(flatten)]
    pub frame: CurveFrame,
}

/// An evenly spaced stoichiometry grid `[lo, hi]` with `count` points.
///
/// Construct through [`GridSpec::new`](crate::curve::GridSpec::new), which
/// rejects malformed ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSpec {
    pub(crate) lo: f64,
    pub(crate) hi: f64,
    pub(crate) count: usize,
}

/// Where the aggregated trials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// CSV with `K3PO4`, `buffer`, `tot_case`, `good_case` columns.
    Csv(PathBuf),
    /// Seeded synthetic dataset drawn from reference coefficients.
    Synthetic { seed: u64 },
}

/// Range and step of the buffer volume control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferControl {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub initial: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: DataSource,

    /// Newton iteration cap.
    pub max_iter: usize,
    /// Convergence tolerance on the infinity norm of the Newton step.
    pub tol: f64,

    /// Lower end of the stoichiometry grid (upper end is the max observed value).
    pub grid_lo: f64,
    pub grid_points: usize,

    pub buffer: BufferControl,

    pub plot_width: usize,
    pub plot_height: usize,
    pub export_curve: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Csv(PathBuf::from("emulsion.csv")),
            max_iter: 100,
            tol: 1e-8,
            grid_lo: DEFAULT_LO,
            grid_points: DEFAULT_POINTS,
            buffer: BufferControl {
                min: 0.0,
                max: 2.0,
                step: 0.1,
                initial: 1.0,
            },
            plot_width: 80,
            plot_height: 20,
            export_curve: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_in_snake_case() {
        assert_eq!(serde_json::to_string(&Outcome::NoEmulsion).unwrap(), "\"no_emulsion\"");
        assert_eq!(Outcome::NoEmulsion.value(), 1.0);
        assert_eq!(Outcome::Emulsion.value(), 0.0);
    }

    #[test]
    fn default_config_uses_grid_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.grid_lo, DEFAULT_LO);
        assert_eq!(config.grid_points, DEFAULT_POINTS);
    }
}
