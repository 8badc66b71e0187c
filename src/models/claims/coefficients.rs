//! Fitted state of the claims model and its derivation from history.

use serde::{Deserialize, Serialize};

use crate::correlation::TimeSeriesCorrelation;
use crate::utils::{filter_outliers, linear_fit, mean, population_std};

/// Distance, in standard deviations, beyond which a per-period average claim
/// amount is discarded.
pub const OUTLIER_SIGMAS: f64 = 3.0;

/// Coefficients derived by [`ClaimsPredictor::fit`](super::ClaimsPredictor::fit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelCoefficients {
    /// Months by which reclamations lead claim sums.
    pub lag_months: usize,
    /// Correlation between reclamations and claim sums at `lag_months`.
    pub correlation: f64,
    /// Mean share of reclamations that became claims.
    pub conversion_rate: f64,
    /// Standard deviation of the per-period conversion ratios.
    pub conversion_std: f64,
    /// Mean claim amount after outlier filtering.
    pub avg_claim_amount: f64,
    /// Standard deviation of the filtered claim amounts.
    pub avg_claim_std: f64,
    /// Slope of claim sum against reclamation count.
    pub regression_slope: f64,
    /// Intercept of claim sum against reclamation count.
    pub regression_intercept: f64,
    /// Coefficient of determination of the regression.
    pub r_squared: f64,
    /// Standard deviation of the regression residuals.
    pub residual_std: f64,
}

/// Input series and lag configuration for a fit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FitInputs<'a> {
    pub reclamations: &'a [f64],
    pub claim_counts: &'a [f64],
    pub claim_sums: &'a [f64],
    pub fixed_lag: Option<usize>,
    pub max_lag: u32,
}

/// Pair `x[t]` with `y[t + lag]`, truncated to the common length.
///
/// A lag of 0, or one that does not fit inside the overlap, leaves the series
/// unshifted.
pub(crate) fn align_at_lag<'a>(x: &'a [f64], y: &'a [f64], lag: usize) -> (&'a [f64], &'a [f64]) {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    if lag > 0 && lag < n {
        (&x[..n - lag], &y[lag..])
    } else {
        (x, y)
    }
}

/// Ratio of `num` to `den`, with the denominator floored at 1.
fn floored_ratios(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter().zip(den).map(|(n, d)| n / d.max(1.0)).collect()
}

pub(crate) fn derive(
    inputs: FitInputs<'_>,
    correlation: &TimeSeriesCorrelation,
) -> ModelCoefficients {
    let (lag_months, corr) = match inputs.fixed_lag {
        Some(lag) => {
            let at = correlation.calculate_correlation_at_lag(lag.min(i32::MAX as usize) as i32);
            (lag, at.correlation)
        }
        None => {
            let max_lag = inputs.max_lag.min(i32::MAX as u32) as i32;
            match correlation.find_optimal_lag(max_lag, 0) {
                Ok(opt) => (opt.optimal_lag.max(0) as usize, opt.correlation),
                Err(err) => {
                    tracing::warn!(reason = %err, "lag search failed, assuming no lag");
                    (0, correlation.calculate_correlation_at_lag(0).correlation)
                }
            }
        }
    };

    let (rec, counts) = align_at_lag(inputs.reclamations, inputs.claim_counts, lag_months);
    let ratios = floored_ratios(counts, rec);
    let conversion_rate = mean(&ratios);
    let conversion_std = population_std(&ratios);

    let n = inputs.claim_counts.len().min(inputs.claim_sums.len());
    let amounts = floored_ratios(&inputs.claim_sums[..n], &inputs.claim_counts[..n]);
    let amounts = filter_outliers(&amounts, OUTLIER_SIGMAS);
    let avg_claim_amount = mean(&amounts);
    let avg_claim_std = population_std(&amounts);

    let (x, y) = align_at_lag(inputs.reclamations, inputs.claim_sums, lag_months);
    let fit = linear_fit(x, y);

    tracing::debug!(
        lag_months,
        correlation = corr,
        conversion_rate,
        slope = fit.slope,
        r_squared = fit.r_squared,
        "claims model fitted"
    );

    ModelCoefficients {
        lag_months,
        correlation: corr,
        conversion_rate,
        conversion_std,
        avg_claim_amount,
        avg_claim_std,
        regression_slope: fit.slope,
        regression_intercept: fit.intercept,
        r_squared: fit.r_squared,
        residual_std: fit.residual_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn align_shifts_and_truncates() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        let (a, b) = align_at_lag(&x, &y, 1);
        assert_eq!(a, &[1.0, 2.0, 3.0]);
        assert_eq!(b, &[20.0, 30.0, 40.0]);

        let (a, b) = align_at_lag(&x, &y, 0);
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);

        // lag beyond the overlap leaves the series unshifted
        let (a, b) = align_at_lag(&x, &y, 9);
        assert_eq!(a, &x[..4]);
        assert_eq!(b, &y[..]);
    }

    #[test]
    fn floored_ratio_avoids_division_by_zero() {
        let r = floored_ratios(&[3.0, 4.0, 0.0], &[0.0, 2.0, 0.5]);
        assert_eq!(r, vec![3.0, 2.0, 0.0]);
    }

    #[test]
    fn derive_with_fixed_lag() {
        let rec = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let counts = [5.0, 5.0, 10.0, 15.0, 20.0, 25.0];
        let sums: Vec<f64> = counts.iter().map(|c| c * 100.0).collect();
        let inputs = FitInputs {
            reclamations: &rec,
            claim_counts: &counts,
            claim_sums: &sums,
            fixed_lag: Some(1),
            max_lag: 6,
        };
        let corr = TimeSeriesCorrelation::new(rec.to_vec(), sums.clone());
        let c = derive(inputs, &corr);

        assert_eq!(c.lag_months, 1);
        // counts[1..] / rec[..5] = 0.5 each
        assert_relative_eq!(c.conversion_rate, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.conversion_std, 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.avg_claim_amount, 100.0, epsilon = 1e-12);
        // sums[1..] = 50 * rec[..5]
        assert_relative_eq!(c.regression_slope, 50.0, epsilon = 1e-9);
        assert_relative_eq!(c.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn derive_with_too_little_data() {
        let inputs = FitInputs {
            reclamations: &[4.0],
            claim_counts: &[1.0],
            claim_sums: &[250.0],
            fixed_lag: None,
            max_lag: 6,
        };
        let corr = TimeSeriesCorrelation::new(vec![4.0], vec![250.0]);
        let c = derive(inputs, &corr);
        assert_eq!(c.lag_months, 0);
        assert_eq!(c.regression_slope, 0.0);
        assert_eq!(c.regression_intercept, 250.0);
        assert_eq!(c.r_squared, 0.0);
        assert_eq!(c.correlation, 0.0);
    }
}
