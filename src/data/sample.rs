//! Synthetic aggregated trials drawn from known logistic coefficients.
//!
//! Used for demos (`--synthetic`) and for checking that the fitter recovers
//! the coefficients it was fed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Binomial;

use crate::domain::{AggregatedTrial, FittedModel};
use crate::error::AppError;

/// Coefficients used when no dataset is supplied.
pub fn reference_model() -> FittedModel {
    FittedModel::new(0.5, -0.2, 1.0)
}

/// Trial conditions: every stoichiometry crossed with every buffer volume.
#[derive(Debug, Clone)]
pub struct SampleDesign {
    pub stoichiometry: Vec<f64>,
    pub buffer: Vec<f64>,
    pub trials_per_cell: i64,
}

impl SampleDesign {
    /// Stoichiometry 1..=10 (step 0.5) × buffer 0..=2 (step 0.25).
    pub fn reference(trials_per_cell: i64) -> Self {
        Self {
            stoichiometry: (0..19).map(|i| 1.0 + 0.5 * i as f64).collect(),
            buffer: (0..9).map(|i| 0.25 * i as f64).collect(),
            trials_per_cell,
        }
    }

    fn cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.stoichiometry
            .iter()
            .flat_map(|&x| self.buffer.iter().map(move |&b| (x, b)))
    }
}

/// Draw `successful ~ Binomial(total, p(x, b))` for each cell.
pub fn generate_trials(
    model: &FittedModel,
    design: &SampleDesign,
    seed: u64,
) -> Result<Vec<AggregatedTrial>, AppError> {
    if design.trials_per_cell < 0 {
        return Err(AppError::input("Trials per cell must be >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();

    for (x, b) in design.cells() {
        let p = model.probability(x, b);
        let dist = Binomial::new(design.trials_per_cell as u64, p)
            .map_err(|e| AppError::input(format!("Binomial distribution error: {e}")))?;
        let successful = dist.sample(&mut rng) as i64;
        rows.push(AggregatedTrial {
            stoichiometry: x,
            buffer: b,
            total: design.trials_per_cell,
            successful,
        });
    }

    Ok(rows)
}

/// Noise-free counts: `successful = round(total · p(x, b))` for each cell.
pub fn expected_trials(model: &FittedModel, design: &SampleDesign) -> Vec<AggregatedTrial> {
    design
        .cells()
        .map(|(x, b)| {
            let p = model.probability(x, b);
            AggregatedTrial {
                stoichiometry: x,
                buffer: b,
                total: design.trials_per_cell,
                successful: (design.trials_per_cell as f64 * p).round() as i64,
            }
        })
        .collect()
}
