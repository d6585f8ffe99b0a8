//! Maximum-likelihood fit of the two-covariate logistic model.
//!
//! Given binary observations `(x_i, b_i, y_i)` we maximize the Bernoulli
//! log-likelihood of
//!
//! ```text
//! logit P(y = 1) = β0 + β1·x + β2·b
//! ```
//!
//! with Newton-Raphson (equivalently IRLS), starting from `β = 0`:
//!
//! - accumulate the score `U = Xᵀ(y - p)` and information `I = XᵀWX`, `W = diag(p(1-p))`
//! - solve `I·δ = U`, update `β += δ`
//! - stop once `‖δ‖∞ < tol`, or fail after `max_iter` steps
//!
//! Separable data has no finite maximum: coefficients run off to infinity while
//! the fitted probabilities snap to 0/1 and `I` collapses. Both symptoms are
//! detected and reported as a separation error instead of returning huge
//! coefficients.

use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{AppConfig, FitReport, FittedModel, Observation, Outcome};
use crate::error::AppError;
use crate::math::{bernoulli_log_likelihood, sigmoid, solve_newton_step};
use crate::models::{design_row, linear_predictor};

/// Observations per parallel work unit. Partial sums are combined in chunk
/// order, so results do not depend on the thread count.
const CHUNK: usize = 4096;

/// Largest `|y - p|` below which every outcome counts as perfectly predicted.
const PERFECT_FIT_EPS: f64 = 1e-8;

/// Fitting options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Newton iteration cap.
    pub max_iter: usize,
    /// Convergence tolerance on the infinity norm of the Newton step.
    pub tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

impl FitOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            tol: config.tol,
        }
    }
}

/// Sums over observations at a fixed coefficient vector.
#[derive(Debug, Clone)]
struct Accumulated {
    info: Matrix3<f64>,
    score: Vector3<f64>,
    log_likelihood: f64,
    max_abs_residual: f64,
}

impl Accumulated {
    fn zero() -> Self {
        Self {
            info: Matrix3::zeros(),
            score: Vector3::zeros(),
            log_likelihood: 0.0,
            max_abs_residual: 0.0,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.info += other.info;
        self.score += other.score;
        self.log_likelihood += other.log_likelihood;
        self.max_abs_residual = self.max_abs_residual.max(other.max_abs_residual);
        self
    }
}

/// Fit the logistic model to all observations jointly.
pub fn fit_logistic(observations: &[Observation], opts: &FitOptions) -> Result<FitReport, AppError> {
    if observations.is_empty() {
        return Err(AppError::new(
            crate::error::ErrorKind::EmptyData,
            "No observations to fit.",
        ));
    }
    if opts.max_iter == 0 {
        return Err(AppError::input("Max iterations must be >= 1."));
    }
    if !(opts.tol.is_finite() && opts.tol > 0.0) {
        return Err(AppError::input(format!(
            "Convergence tolerance must be finite and > 0 (got {}).",
            opts.tol
        )));
    }

    let mut beta = [0.0; 3];
    let mut step = f64::INFINITY;

    for iter in 1..=opts.max_iter {
        let acc = accumulate(observations, &beta);

        if acc.max_abs_residual < PERFECT_FIT_EPS {
            return Err(AppError::separation(format!(
                "Outcomes are perfectly separated by the covariates (iteration {iter}); coefficients are not identifiable."
            )));
        }

        let delta = solve_newton_step(&acc.info, &acc.score).ok_or_else(|| {
            AppError::separation(format!(
                "Information matrix is singular at iteration {iter} (perfect or quasi-separation); coefficients are not identifiable."
            ))
        })?;

        for (b, d) in beta.iter_mut().zip(delta.iter()) {
            *b += d;
        }
        step = delta.amax();

        debug!(
            iter,
            log_likelihood = acc.log_likelihood,
            step,
            beta0 = beta[0],
            beta1 = beta[1],
            beta2 = beta[2],
            "newton step"
        );

        if beta.iter().any(|b| !b.is_finite()) {
            return Err(AppError::separation(format!(
                "Coefficients diverged at iteration {iter}; the data look separable."
            )));
        }

        if step < opts.tol {
            let final_acc = accumulate(observations, &beta);
            let n_success = observations
                .iter()
                .filter(|o| o.outcome == Outcome::NoEmulsion)
                .count();
            let report = FitReport {
                model: FittedModel::new(beta[0], beta[1], beta[2]),
                iterations: iter,
                log_likelihood: final_acc.log_likelihood,
                null_log_likelihood: null_log_likelihood(n_success, observations.len()),
                n_obs: observations.len(),
                n_success,
            };
            info!(
                iterations = iter,
                intercept = beta[0],
                stoichiometry = beta[1],
                buffer = beta[2],
                log_likelihood = report.log_likelihood,
                "logistic fit converged"
            );
            return Ok(report);
        }
    }

    Err(AppError::non_convergence(opts.max_iter, step))
}

fn accumulate(observations: &[Observation], beta: &[f64; 3]) -> Accumulated {
    let partials: Vec<Accumulated> = observations
        .par_chunks(CHUNK)
        .map(|chunk| accumulate_chunk(chunk, beta))
        .collect();

    partials.into_iter().fold(Accumulated::zero(), Accumulated::merge)
}

fn accumulate_chunk(chunk: &[Observation], beta: &[f64; 3]) -> Accumulated {
    let mut acc = Accumulated::zero();
    for obs in chunk {
        let row = design_row(obs.stoichiometry, obs.buffer);
        let eta = linear_predictor(beta, obs.stoichiometry, obs.buffer);
        let y = obs.outcome.value();
        let p = sigmoid(eta);
        let w = p * (1.0 - p);
        let r = y - p;

        for i in 0..3 {
            acc.score[i] += r * row[i];
            for j in 0..3 {
                acc.info[(i, j)] += w * row[i] * row[j];
            }
        }
        acc.log_likelihood += bernoulli_log_likelihood(y, eta);
        acc.max_abs_residual = acc.max_abs_residual.max(r.abs());
    }
    acc
}

/// Log-likelihood of the intercept-only model (`p = successes / n`).
fn null_log_likelihood(n_success: usize, n: usize) -> f64 {
    let k = n_success as f64;
    let n = n as f64;
    let p = k / n;
    let mut ll = 0.0;
    if k > 0.0 {
        ll += k * p.ln();
    }
    if n - k > 0.0 {
        ll += (n - k) * (1.0 - p).ln();
    }
    ll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleDesign, expand_trials, expected_trials, generate_trials, reference_model};
    use crate::domain::AggregatedTrial;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn observations(rows: &[AggregatedTrial]) -> Vec<Observation> {
        expand_trials(rows).unwrap()
    }

    #[test]
    fn recovers_generating_coefficients_from_expected_counts() {
        let rows = expected_trials(&reference_model(), &SampleDesign::reference(2000));
        let report = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap();

        assert_abs_diff_eq!(report.model.intercept(), 0.5, epsilon = 0.05);
        assert_abs_diff_eq!(report.model.stoichiometry_weight(), -0.2, epsilon = 0.05);
        assert_abs_diff_eq!(report.model.buffer_weight(), 1.0, epsilon = 0.05);
        assert!(report.iterations < 20);
    }

    #[test]
    fn recovers_generating_coefficients_from_random_draws() {
        let rows = generate_trials(&reference_model(), &SampleDesign::reference(1000), 11).unwrap();
        let report = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap();

        assert_abs_diff_eq!(report.model.intercept(), 0.5, epsilon = 0.15);
        assert_abs_diff_eq!(report.model.stoichiometry_weight(), -0.2, epsilon = 0.15);
        assert_abs_diff_eq!(report.model.buffer_weight(), 1.0, epsilon = 0.15);
    }

    #[test]
    fn fit_is_invariant_to_buffer_units() {
        let scale = 1e6;
        let rows: Vec<AggregatedTrial> = expected_trials(&reference_model(), &SampleDesign::reference(2000))
            .into_iter()
            .map(|r| AggregatedTrial {
                buffer: r.buffer * scale,
                ..r
            })
            .collect();
        let report = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap();

        assert_abs_diff_eq!(report.model.intercept(), 0.5, epsilon = 0.05);
        assert_abs_diff_eq!(report.model.stoichiometry_weight(), -0.2, epsilon = 0.05);
        assert_abs_diff_eq!(report.model.buffer_weight() * scale, 1.0, epsilon = 0.05);
    }

    #[test]
    fn perfectly_separable_data_is_rejected() {
        let mut rows = Vec::new();
        for x in 1..=10 {
            for &b in &[0.5, 1.0, 1.5] {
                let successful = if x > 5 { 4 } else { 0 };
                rows.push(AggregatedTrial {
                    stoichiometry: x as f64,
                    buffer: b,
                    total: 4,
                    successful,
                });
            }
        }
        let err = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Separation);
    }

    #[test]
    fn all_successes_are_rejected_as_separation() {
        let rows = [
            AggregatedTrial { stoichiometry: 1.0, buffer: 0.0, total: 5, successful: 5 },
            AggregatedTrial { stoichiometry: 2.0, buffer: 1.0, total: 5, successful: 5 },
            AggregatedTrial { stoichiometry: 3.0, buffer: 2.0, total: 5, successful: 5 },
            AggregatedTrial { stoichiometry: 4.0, buffer: 0.5, total: 5, successful: 5 },
        ];
        let err = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Separation);
    }

    #[test]
    fn constant_covariate_makes_information_singular() {
        // Buffer never varies, so β0 and β2 cannot be told apart.
        let rows: Vec<AggregatedTrial> = (1..=6)
            .map(|x| AggregatedTrial {
                stoichiometry: x as f64,
                buffer: 1.0,
                total: 10,
                successful: 3 + (x % 3),
            })
            .collect();
        let err = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Separation);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let rows = expected_trials(&reference_model(), &SampleDesign::reference(50));
        let opts = FitOptions { max_iter: 1, tol: 1e-8 };
        let err = fit_logistic(&observations(&rows), &opts).unwrap_err();
        match err.kind() {
            ErrorKind::NonConvergence { iterations, residual } => {
                assert_eq!(*iterations, 1);
                assert!(*residual > 1e-8);
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = fit_logistic(&[], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EmptyData);
    }

    #[test]
    fn observation_order_does_not_matter() {
        let rows = generate_trials(&reference_model(), &SampleDesign::reference(30), 3).unwrap();
        let obs = observations(&rows);
        let mut reversed = obs.clone();
        reversed.reverse();

        let a = fit_logistic(&obs, &FitOptions::default()).unwrap();
        let b = fit_logistic(&reversed, &FitOptions::default()).unwrap();
        for (x, y) in a.model.coefficients().iter().zip(b.model.coefficients().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn fit_improves_on_null_model() {
        let rows = generate_trials(&reference_model(), &SampleDesign::reference(40), 5).unwrap();
        let report = fit_logistic(&observations(&rows), &FitOptions::default()).unwrap();
        assert!(report.log_likelihood >= report.null_log_likelihood);
        let r2 = report.pseudo_r2();
        assert!((0.0..=1.0).contains(&r2), "pseudo r2 = {r2}");
        assert_eq!(report.n_obs, 19 * 9 * 40);
    }

    #[test]
    fn null_log_likelihood_handles_degenerate_rates() {
        assert_eq!(null_log_likelihood(0, 10), 0.0);
        assert_eq!(null_log_likelihood(10, 10), 0.0);
        let expected = 10.0 * 0.5f64.ln() + 10.0 * 0.5f64.ln();
        assert_abs_diff_eq!(null_log_likelihood(10, 20), expected, epsilon = 1e-12);
    }
}
