//! Shared startup pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load trials -> expand -> fit -> default grid
//!
//! It runs once; the resulting `Session` is read-only for the rest of the run.

use tracing::info;

use crate::curve::predict_curve;
use crate::data::{SampleDesign, dataset_stats, expand_trials, generate_trials, reference_model};
use crate::domain::{AggregatedTrial, AppConfig, CurveFrame, DataSource, DatasetStats, FitReport, FittedModel, GridSpec};
use crate::error::{AppError, ErrorKind};
use crate::fit::{FitOptions, fit_logistic};
use crate::io::load_trials;

use super::controller::ReactiveController;

/// Trials per (stoichiometry, buffer) cell for `--synthetic` runs.
const SYNTHETIC_TRIALS_PER_CELL: i64 = 40;

/// Everything computed at startup.
#[derive(Debug, Clone)]
pub struct Session {
    pub stats: DatasetStats,
    pub fit: FitReport,
    /// Default prediction grid: `[grid_lo, max observed stoichiometry]`.
    pub grid: GridSpec,
}

impl Session {
    pub fn model(&self) -> &FittedModel {
        &self.fit.model
    }

    /// A controller bound to this session's model and grid.
    pub fn controller(&self) -> ReactiveController {
        ReactiveController::new(self.fit.model, self.grid)
    }

    /// Curve at `buffer` over the default grid.
    pub fn frame_at(&self, buffer: f64) -> CurveFrame {
        CurveFrame::new(predict_curve(&self.fit.model, buffer, &self.grid))
    }
}

/// Load the configured trials and run the startup pipeline.
pub fn initialize(config: &AppConfig) -> Result<Session, AppError> {
    let rows = load_source(&config.source)?;
    initialize_from_trials(&rows, config)
}

/// Fetch aggregated trials from the configured source.
pub fn load_source(source: &DataSource) -> Result<Vec<AggregatedTrial>, AppError> {
    match source {
        DataSource::Csv(path) => load_trials(path),
        DataSource::Synthetic { seed } => {
            let design = SampleDesign::reference(SYNTHETIC_TRIALS_PER_CELL);
            let rows = generate_trials(&reference_model(), &design, *seed)?;
            info!(seed, rows = rows.len(), "generated synthetic trials");
            Ok(rows)
        }
    }
}

/// Expand, fit and build the default grid for already loaded trials.
pub fn initialize_from_trials(rows: &[AggregatedTrial], config: &AppConfig) -> Result<Session, AppError> {
    let observations = expand_trials(rows)?;
    let stats = dataset_stats(rows.len(), &observations).ok_or_else(|| {
        AppError::new(ErrorKind::EmptyData, "No observations: every row has a zero trial count.")
    })?;
    info!(
        rows = stats.n_rows,
        observations = stats.n_obs,
        successes = stats.n_success,
        "expanded dataset"
    );

    let fit = fit_logistic(&observations, &FitOptions::from_config(config))?;
    let grid = GridSpec::new(config.grid_lo, stats.stoichiometry_max, config.grid_points)?;

    Ok(Session { stats, fit, grid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::{Render, Trigger};
    use crate::data::expected_trials;

    #[test]
    fn synthetic_session_uses_max_observed_stoichiometry() {
        let config = AppConfig {
            source: DataSource::Synthetic { seed: 1 },
            ..AppConfig::default()
        };
        let session = initialize(&config).unwrap();
        assert_eq!(session.grid.lo(), 1.0);
        assert_eq!(session.grid.hi(), 10.0);
        assert_eq!(session.grid.count(), 50);
        assert_eq!(session.stats.n_obs, 19 * 9 * 40);

        let frame = session.frame_at(1.0);
        assert_eq!(frame.curve.points.len(), 50);
    }

    #[test]
    fn bad_rows_abort_before_fitting() {
        let rows = [AggregatedTrial { stoichiometry: 2.0, buffer: 1.0, total: 3, successful: 5 }];
        let err = initialize_from_trials(&rows, &AppConfig::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataIntegrity { row: 0 });
    }

    #[test]
    fn all_zero_rows_are_empty_data() {
        let rows = [AggregatedTrial { stoichiometry: 2.0, buffer: 1.0, total: 0, successful: 0 }];
        let err = initialize_from_trials(&rows, &AppConfig::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EmptyData);
    }

    #[test]
    fn grid_below_lower_bound_is_invalid_range() {
        // All stoichiometries are below the default grid start of 1.0.
        let design = SampleDesign {
            stoichiometry: vec![0.2, 0.4, 0.6, 0.8],
            buffer: vec![0.0, 1.0, 2.0],
            trials_per_cell: 200,
        };
        let rows = expected_trials(&reference_model(), &design);
        let err = initialize_from_trials(&rows, &AppConfig::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidRange);
    }

    #[test]
    fn session_controller_matches_direct_prediction() {
        let rows = expected_trials(&reference_model(), &SampleDesign::reference(100));
        let session = initialize_from_trials(&rows, &AppConfig::default()).unwrap();
        let mut controller = session.controller();
        let render = controller.handle(Trigger::SliderChanged(0.7));
        assert_eq!(render, Render::Curve(session.frame_at(0.7)));
    }
}
