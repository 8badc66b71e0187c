//! Two-sided significance tests for a Pearson correlation coefficient.

use std::fmt;
use std::sync::Arc;

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Capability turning a correlation and its sample size into a p-value.
///
/// Implementations must return a value in `[0, 1]` that does not increase as
/// `|r|` grows. Callers guarantee `n >= 3`.
pub trait SignificanceTest: Send + Sync + fmt::Debug {
    /// Backend name.
    fn name(&self) -> &str;

    /// Two-sided p-value of `r` over `n` paired observations.
    fn p_value(&self, r: f64, n: usize) -> f64;
}

/// Shared handle to a significance test.
pub type SharedSignificanceTest = Arc<dyn SignificanceTest>;

/// t statistic `r * sqrt((n - 2) / (1 - r²))`; infinite for `|r| = 1`.
pub fn t_statistic(r: f64, n: usize) -> f64 {
    let df = n.saturating_sub(2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 1e-15 {
        return if r >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
    }
    r * (df / denom).sqrt()
}

/// Exact test against Student's t distribution with `n - 2` degrees of freedom.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentT;

impl SignificanceTest for StudentT {
    fn name(&self) -> &str {
        "student-t"
    }

    fn p_value(&self, r: f64, n: usize) -> f64 {
        if n < 3 || !r.is_finite() {
            return 1.0;
        }
        let t = t_statistic(r, n).abs();
        if t.is_infinite() {
            return 0.0;
        }
        match StudentsT::new(0.0, 1.0, (n - 2) as f64) {
            Ok(dist) => (2.0 * (1.0 - dist.cdf(t))).clamp(0.0, 1.0),
            Err(err) => {
                tracing::warn!(
                    reason = %err,
                    n,
                    "student-t unavailable, using normal approximation"
                );
                NormalApproximation.p_value(r, n)
            }
        }
    }
}

/// Rough normal approximation `2 * (1 - Φ(|t|))`.
///
/// This is a heuristic, not a p-value: it ignores the t distribution's
/// heavier tails and overstates significance for small samples. It is bounded
/// in `[0, 1]` and decreasing in `|r|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalApproximation;

impl SignificanceTest for NormalApproximation {
    fn name(&self) -> &str {
        "normal-approximation"
    }

    fn p_value(&self, r: f64, n: usize) -> f64 {
        if n < 3 || !r.is_finite() {
            return 1.0;
        }
        let t = t_statistic(r, n).abs();
        if t.is_infinite() {
            return 0.0;
        }
        match Normal::new(0.0, 1.0) {
            Ok(dist) => (2.0 * (1.0 - dist.cdf(t))).clamp(0.0, 1.0),
            Err(err) => {
                tracing::warn!(reason = %err, n, "normal distribution unavailable");
                1.0
            }
        }
    }
}
