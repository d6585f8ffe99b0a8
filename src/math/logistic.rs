//! Numerically stable logistic primitives.
//!
//! - `sigmoid(x) = 1 / (1 + exp(-x))`
//! - `log1pexp(x) = ln(1 + exp(x))`
//!
//! Numerical notes:
//! - The naive sigmoid overflows `exp(-x)` for very negative `x`. We branch on
//!   the sign so the exponent is always `<= 0`.
//! - `ln(1 + e^x)` is evaluated as `x + ln(1 + e^-x)` for positive `x`, which
//!   keeps the Bernoulli log-likelihood finite for extreme log-odds.

/// Map log-odds to a probability in `[0, 1]`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Compute `ln(1 + exp(x))` without overflow.
pub fn log1pexp(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Bernoulli log-likelihood contribution of outcome `y ∈ {0, 1}` at log-odds `eta`.
pub fn bernoulli_log_likelihood(y: f64, eta: f64) -> f64 {
    y * eta - log1pexp(eta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_half_at_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_saturates_without_nan() {
        for &x in &[-1e6, -800.0, -40.0, 40.0, 800.0, 1e6] {
            let p = sigmoid(x);
            assert!(p.is_finite(), "sigmoid({x}) = {p}");
            assert!((0.0..=1.0).contains(&p));
        }
        assert_eq!(sigmoid(1e6), 1.0);
        assert_eq!(sigmoid(-1e6), 0.0);
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for &x in &[0.1, 1.0, 3.5, 12.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn log1pexp_matches_naive_form_in_safe_range() {
        for &x in &[-20.0, -1.0, 0.0, 0.5, 10.0] {
            let naive = (1.0 + f64::exp(x)).ln();
            assert!((log1pexp(x) - naive).abs() < 1e-12);
        }
        assert_eq!(log1pexp(1000.0), 1000.0);
    }
}
