//! Stoichiometry grid construction.

use crate::domain::GridSpec;
use crate::error::AppError;

/// Default number of grid points.
pub const DEFAULT_POINTS: usize = 50;

/// Default lower end of the stoichiometry grid.
pub const DEFAULT_LO: f64 = 1.0;

impl GridSpec {
    /// Validate an evenly spaced grid over `[lo, hi]` (inclusive) with `count` points.
    ///
    /// `lo == hi` is accepted and yields `count` copies of the same value.
    pub fn new(lo: f64, hi: f64, count: usize) -> Result<Self, AppError> {
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(AppError::invalid_range(format!(
                "Grid bounds must be finite: lo={lo}, hi={hi}."
            )));
        }
        if hi < lo {
            return Err(AppError::invalid_range(format!(
                "Grid upper bound {hi} is below lower bound {lo}."
            )));
        }
        if count < 2 {
            return Err(AppError::invalid_range(format!(
                "Grid needs at least 2 points (got {count})."
            )));
        }
        Ok(Self { lo, hi, count })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Grid values in ascending order. The last value is exactly `hi`.
    pub fn values(&self) -> Vec<f64> {
        let step = (self.hi - self.lo) / (self.count as f64 - 1.0);
        let mut out: Vec<f64> = (0..self.count).map(|i| self.lo + step * i as f64).collect();
        if let Some(last) = out.last_mut() {
            *last = self.hi;
        }
        out
    }
}
