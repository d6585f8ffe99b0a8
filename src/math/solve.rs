//! Newton system solver for the 3-parameter logistic fit.
//!
//! Each Newton-Raphson step solves
//!
//! ```text
//! I(β) · δ = U(β)
//! ```
//!
//! where `I = XᵀWX` is the (symmetric, positive definite) information matrix
//! and `U = Xᵀ(y - p)` is the score.
//!
//! Implementation choices:
//! - `I` is first equilibrated to `D·I·D` with `D = diag(I)^-1/2`, so the
//!   conditioning check does not depend on covariate units.
//! - We reject systems whose equilibrated eigenvalue spread exceeds
//!   `MAX_CONDITION`. On logistic data this happens when weights `p(1-p)`
//!   collapse, which is the signature of (quasi-)separable outcomes.
//! - The equilibrated system is solved with a Cholesky factorization; failure
//!   to factor is treated the same way.

use nalgebra::{Matrix3, Vector3};

/// Largest accepted ratio between the extreme eigenvalues of the equilibrated `I`.
pub const MAX_CONDITION: f64 = 1e12;

/// Solve `info · δ = score`.
///
/// Returns `None` if `info` is singular, near-singular, or not positive definite.
pub fn solve_newton_step(info: &Matrix3<f64>, score: &Vector3<f64>) -> Option<Vector3<f64>> {
    if info.iter().any(|v| !v.is_finite()) || score.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let diag = info.diagonal();
    if diag.iter().any(|&d| !(d > 0.0)) {
        return None;
    }
    let scale = diag.map(|d| 1.0 / d.sqrt());
    let d = Matrix3::from_diagonal(&scale);
    let equilibrated = d * info * d;

    let eig = equilibrated.symmetric_eigenvalues();
    let max = eig.max();
    let min = eig.min();
    if !(max > 0.0) || !(min > 0.0) || max / min > MAX_CONDITION {
        return None;
    }

    // (D·I·D)·z = D·U, then δ = D·z.
    let z = equilibrated.cholesky()?.solve(&scale.component_mul(score));
    let delta = scale.component_mul(&z);
    if delta.iter().all(|v| v.is_finite()) {
        Some(delta)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_well_conditioned_system() {
        let info = Matrix3::new(4.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0);
        let expected = Vector3::new(1.0, -2.0, 0.5);
        let score = info * expected;

        let delta = solve_newton_step(&info, &score).unwrap();
        assert!((delta - expected).amax() < 1e-12);
    }

    #[test]
    fn badly_scaled_but_well_posed_system_is_solved() {
        // Third covariate measured in units 1e6 times smaller.
        let k = 1e6;
        let base = Matrix3::new(4.0, 1.0, 0.5, 1.0, 3.0, 0.5, 0.5, 0.5, 2.0);
        let d = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, k));
        let info = d * base * d;
        let expected = Vector3::new(1.0, -2.0, 0.5 / k);
        let score = info * expected;

        let delta = solve_newton_step(&info, &score).unwrap();
        assert!((delta[0] - expected[0]).abs() < 1e-9);
        assert!((delta[1] - expected[1]).abs() < 1e-9);
        assert!((delta[2] * k - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_singular_matrix() {
        // Third column is the sum of the first two.
        let info = Matrix3::new(1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0);
        let score = Vector3::new(1.0, 1.0, 1.0);
        assert!(solve_newton_step(&info, &score).is_none());
    }

    #[test]
    fn rejects_zero_matrix() {
        assert!(solve_newton_step(&Matrix3::zeros(), &Vector3::zeros()).is_none());
    }
}
