//! Expansion of aggregated trial counts into binary observations.
//!
//! A row `(x, b, total, successful)` becomes `total` observations at `(x, b)`:
//! the first `successful` are labelled no-emulsion and the remainder emulsion.
//! The order only makes the output reproducible; the fitter treats the
//! observations as an exchangeable sample.

use tracing::debug;

use crate::domain::{AggregatedTrial, DatasetStats, Observation, Outcome};
use crate::error::AppError;

/// Expand aggregated rows into one observation per trial.
///
/// All rows are validated before anything is emitted, so a bad row never
/// yields a partial dataset.
pub fn expand_trials(rows: &[AggregatedTrial]) -> Result<Vec<Observation>, AppError> {
    let mut n_obs = 0usize;
    for (idx, row) in rows.iter().enumerate() {
        validate_row(idx, row)?;
        n_obs += row.total as usize;
    }

    let mut out = Vec::with_capacity(n_obs);
    for row in rows {
        for case in 0..row.total {
            let outcome = if case < row.successful {
                Outcome::NoEmulsion
            } else {
                Outcome::Emulsion
            };
            out.push(Observation {
                stoichiometry: row.stoichiometry,
                buffer: row.buffer,
                outcome,
            });
        }
    }

    debug!(rows = rows.len(), observations = out.len(), "expanded aggregated trials");
    Ok(out)
}

fn validate_row(idx: usize, row: &AggregatedTrial) -> Result<(), AppError> {
    if row.total < 0 {
        return Err(AppError::data_integrity(
            idx,
            format!("negative total trial count ({})", row.total),
        ));
    }
    if row.successful < 0 {
        return Err(AppError::data_integrity(
            idx,
            format!("negative successful trial count ({})", row.successful),
        ));
    }
    if row.successful > row.total {
        return Err(AppError::data_integrity(
            idx,
            format!(
                "successful trials ({}) exceed total trials ({})",
                row.successful, row.total
            ),
        ));
    }
    if !(row.stoichiometry.is_finite() && row.stoichiometry >= 0.0) {
        return Err(AppError::data_integrity(
            idx,
            format!("stoichiometry must be a finite value >= 0 (got {})", row.stoichiometry),
        ));
    }
    if !(row.buffer.is_finite() && row.buffer >= 0.0) {
        return Err(AppError::data_integrity(
            idx,
            format!("buffer volume must be a finite value >= 0 (got {})", row.buffer),
        ));
    }
    Ok(())
}

/// Summarize expanded observations. Returns `None` when there are none.
pub fn dataset_stats(n_rows: usize, observations: &[Observation]) -> Option<DatasetStats> {
    let first = observations.first()?;
    let mut stats = DatasetStats {
        n_rows,
        n_obs: observations.len(),
        n_success: 0,
        stoichiometry_min: first.stoichiometry,
        stoichiometry_max: first.stoichiometry,
        buffer_min: first.buffer,
        buffer_max: first.buffer,
    };

    for obs in observations {
        if obs.outcome == Outcome::NoEmulsion {
            stats.n_success += 1;
        }
        stats.stoichiometry_min = stats.stoichiometry_min.min(obs.stoichiometry);
        stats.stoichiometry_max = stats.stoichiometry_max.max(obs.stoichiometry);
        stats.buffer_min = stats.buffer_min.min(obs.buffer);
        stats.buffer_max = stats.buffer_max.max(obs.buffer);
    }

    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn trial(stoichiometry: f64, buffer: f64, total: i64, successful: i64) -> AggregatedTrial {
        AggregatedTrial {
            stoichiometry,
            buffer,
            total,
            successful,
        }
    }

    #[test]
    fn labels_first_successful_cases_as_no_emulsion() {
        let obs = expand_trials(&[trial(2.0, 0.5, 4, 3)]).unwrap();
        let outcomes: Vec<Outcome> = obs.iter().map(|o| o.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::NoEmulsion,
                Outcome::NoEmulsion,
                Outcome::NoEmulsion,
                Outcome::Emulsion
            ]
        );
        assert!(obs.iter().all(|o| o.stoichiometry == 2.0 && o.buffer == 0.5));
    }

    #[test]
    fn preserves_row_order_and_skips_empty_rows() {
        let rows = [trial(1.0, 0.0, 2, 0), trial(9.0, 9.0, 0, 0), trial(3.0, 1.0, 1, 1)];
        let obs = expand_trials(&rows).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].stoichiometry, 1.0);
        assert_eq!(obs[1].stoichiometry, 1.0);
        assert_eq!(obs[2].stoichiometry, 3.0);
        assert_eq!(obs[2].outcome, Outcome::NoEmulsion);
    }

    #[test]
    fn rejects_successful_above_total() {
        let rows = [trial(1.0, 1.0, 2, 2), trial(2.0, 1.0, 3, 5)];
        let err = expand_trials(&rows).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataIntegrity { row: 1 });
    }

    #[test]
    fn rejects_negative_counts() {
        let err = expand_trials(&[trial(1.0, 1.0, -1, 0)]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataIntegrity { row: 0 });

        let err = expand_trials(&[trial(1.0, 1.0, 0, 0), trial(1.0, 1.0, 3, -2)]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataIntegrity { row: 1 });
    }

    #[test]
    fn rejects_non_finite_covariates() {
        let err = expand_trials(&[trial(f64::NAN, 1.0, 1, 1)]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataIntegrity { row: 0 });
    }

    #[test]
    fn stats_use_observations_not_rows() {
        // The empty row at x=12 contributes no observations, so it must not widen the range.
        let rows = [trial(1.5, 0.2, 2, 1), trial(12.0, 2.0, 0, 0), trial(4.0, 1.0, 3, 3)];
        let obs = expand_trials(&rows).unwrap();
        let stats = dataset_stats(rows.len(), &obs).unwrap();
        assert_eq!(stats.n_rows, 3);
        assert_eq!(stats.n_obs, 5);
        assert_eq!(stats.n_success, 4);
        assert_eq!(stats.stoichiometry_max, 4.0);
        assert_eq!(stats.buffer_max, 1.0);
        assert!(dataset_stats(0, &[]).is_none());
    }

    fn arb_trial() -> impl Strategy<Value = AggregatedTrial> {
        (0.0..20.0f64, 0.0..3.0f64, 0i64..40)
            .prop_flat_map(|(x, b, total)| (Just(x), Just(b), Just(total), 0..=total))
            .prop_map(|(x, b, total, successful)| trial(x, b, total, successful))
    }

    proptest! {
        #[test]
        fn expansion_preserves_counts(rows in prop::collection::vec(arb_trial(), 0..30)) {
            let obs = expand_trials(&rows).unwrap();
            let expected: i64 = rows.iter().map(|r| r.total).sum();
            prop_assert_eq!(obs.len() as i64, expected);

            let mut offset = 0usize;
            for row in &rows {
                let slice = &obs[offset..offset + row.total as usize];
                let ones = slice.iter().filter(|o| o.outcome == Outcome::NoEmulsion).count();
                prop_assert_eq!(ones as i64, row.successful);
                offset += row.total as usize;
            }
        }
    }
}
