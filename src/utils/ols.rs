//! Ordinary least squares utilities.
//!
//! Provides the closed-form single-regressor fit used by the trend and claim
//! models, and a small normal-equation solver for the multi-feature
//! regressions used by the time-index models.

use crate::error::{ForecastError, Result};
use crate::utils::stats::negligible_spread;

/// Fitted simple linear regression `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// Coefficient of determination, `0.0` when `y` has no variance.
    pub r_squared: f64,
    /// Population standard deviation of the residuals.
    pub residual_std: f64,
}

impl LinearFit {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Degenerate inputs never fail:
/// - fewer than two points gives slope 0 and the mean of `y` (or 0) as intercept;
/// - constant `x` gives slope 0 and the mean of `y` as intercept.
///
/// Only the first `min(x.len(), y.len())` pairs are used.
pub fn linear_fit(x: &[f64], y: &[f64]) -> LinearFit {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    let mean_y = if n == 0 {
        0.0
    } else {
        y.iter().sum::<f64>() / n as f64
    };

    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
            r_squared: 0.0,
            residual_std: 0.0,
        };
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    let mut raw_xx = 0.0;
    let mut raw_yy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        ss_xx += (xi - mean_x).powi(2);
        ss_xy += (xi - mean_x) * (yi - mean_y);
        raw_xx += xi * xi;
        raw_yy += yi * yi;
    }

    let slope = if negligible_spread(ss_xx, raw_xx, n) {
        0.0
    } else {
        ss_xy / ss_xx
    };
    let intercept = mean_y - slope * mean_x;

    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| yi - (slope * xi + intercept))
        .collect();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();

    let r_squared = if negligible_spread(ss_tot, raw_yy, n) {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    let mean_res = residuals.iter().sum::<f64>() / n as f64;
    let residual_std =
        (residuals.iter().map(|r| (r - mean_res).powi(2)).sum::<f64>() / n as f64).sqrt();

    LinearFit {
        slope,
        intercept,
        r_squared,
        residual_std,
    }
}

/// OLS slope of `values` against their positional index `0..n`.
///
/// Returns 0 for fewer than two values.
pub fn trend_slope(values: &[f64]) -> f64 {
    let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    linear_fit(&index, values).slope
}

/// Fit `y = beta_0 + sum_j beta_j * columns[j]` via the normal equations.
///
/// `ridge` adds an L2 penalty to every coefficient except the intercept.
/// Returns `[beta_0, beta_1, ...]`.
pub fn fit_columns(columns: &[Vec<f64>], y: &[f64], ridge: f64) -> Result<Vec<f64>> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    for col in columns {
        if col.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: col.len(),
            });
        }
    }

    let p = columns.len() + 1;
    let feature = |j: usize, obs: usize| if j == 0 { 1.0 } else { columns[j - 1][obs] };

    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for obs in 0..n {
        for i in 0..p {
            let xi = feature(i, obs);
            xty[i] += xi * y[obs];
            for j in 0..p {
                xtx[i][j] += xi * feature(j, obs);
            }
        }
    }
    for (i, row) in xtx.iter_mut().enumerate().skip(1) {
        row[i] += ridge;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError("normal equations are not positive definite".into())
    })?;
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::ComputationError(
            "regression produced non-finite coefficients".into(),
        ));
    }
    Ok(beta)
}

/// Solve `A x = b` for symmetric positive definite `A` by Cholesky factorization.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                if sum <= 1e-12 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * z[j]).sum::<f64>();
        z[i] = sum / l[i][i];
    }

    // Backward substitution: L' x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = z[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    Some(x)
}
