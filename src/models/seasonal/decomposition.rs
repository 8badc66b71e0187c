//! Classical seasonal decomposition with linear trend extrapolation.
//!
//! The trend is a centered moving average over one full cycle (a 2×m average
//! for even periods). Seasonal factors are the per-position averages of the
//! detrended series, normalized so they average to 1 (multiplicative) or sum
//! to 0 (additive). Forecasts extrapolate the trend with an OLS line and
//! re-apply the seasonal factor.

use crate::error::{ForecastError, Result};
use crate::models::seasonal::SeasonalType;
use crate::utils::ols::{linear_fit, LinearFit};

/// Components of a classical decomposition.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Centered moving average; `None` where the window does not fit.
    pub trend: Vec<Option<f64>>,
    /// Seasonal factor per position in the cycle.
    pub seasonal: Vec<f64>,
    /// Line fitted through the defined trend values.
    pub trend_line: LinearFit,
    /// Type of seasonality used.
    pub seasonal_type: SeasonalType,
    n: usize,
}

impl Decomposition {
    /// Decompose `values` with seasonal period `period`.
    pub fn fit(values: &[f64], period: usize, seasonal_type: SeasonalType) -> Result<Self> {
        let n = values.len();
        if period < 2 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 2".into(),
            ));
        }
        if n < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }
        if seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&v| v <= 0.0) {
            return Err(ForecastError::ComputationError(
                "multiplicative decomposition requires strictly positive data".into(),
            ));
        }

        let trend = centered_moving_average(values, period);

        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, (&y, t)) in values.iter().zip(&trend).enumerate() {
            if let Some(t) = *t {
                let detrended = match seasonal_type {
                    SeasonalType::Multiplicative => y / t,
                    SeasonalType::Additive => y - t,
                };
                sums[i % period] += detrended;
                counts[i % period] += 1;
            }
        }
        let neutral = match seasonal_type {
            SeasonalType::Multiplicative => 1.0,
            SeasonalType::Additive => 0.0,
        };
        let mut seasonal: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| if c > 0 { s / c as f64 } else { neutral })
            .collect();

        let avg = seasonal.iter().sum::<f64>() / period as f64;
        match seasonal_type {
            SeasonalType::Multiplicative => {
                if avg.abs() < 1e-10 {
                    return Err(ForecastError::ComputationError(
                        "seasonal factors collapsed to zero".into(),
                    ));
                }
                seasonal.iter_mut().for_each(|s| *s /= avg);
            }
            SeasonalType::Additive => seasonal.iter_mut().for_each(|s| *s -= avg),
        }

        let (x, y): (Vec<f64>, Vec<f64>) = trend
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|t| (i as f64, t)))
            .unzip();
        let trend_line = linear_fit(&x, &y);

        Ok(Self {
            trend,
            seasonal,
            trend_line,
            seasonal_type,
            n,
        })
    }

    /// Project `horizon` steps past the end of the decomposed series.
    pub fn predict(&self, horizon: usize) -> Vec<f64> {
        let period = self.seasonal.len();
        (0..horizon)
            .map(|h| {
                let t = self.n + h;
                let trend = self.trend_line.predict(t as f64);
                let s = self.seasonal[t % period];
                match self.seasonal_type {
                    SeasonalType::Multiplicative => trend * s,
                    SeasonalType::Additive => trend + s,
                }
            })
            .collect()
    }
}

/// Centered moving average spanning one cycle.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut out = vec![None; n];
    if n <= 2 * half {
        return out;
    }

    for i in half..n - half {
        let avg = if period % 2 == 0 {
            let inner: f64 = values[i + 1 - half..i + half].iter().sum();
            (0.5 * values[i - half] + inner + 0.5 * values[i + half]) / period as f64
        } else {
            values[i - half..=i + half].iter().sum::<f64>() / period as f64
        };
        out[i] = Some(avg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moving_average_of_line_is_line() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let ma = centered_moving_average(&values, 12);
        assert!(ma[5].is_none());
        assert!(ma[24].is_none());
        for (i, v) in ma.iter().enumerate().take(24).skip(6) {
            assert_relative_eq!(v.unwrap(), i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn odd_period_moving_average() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ma = centered_moving_average(&values, 3);
        assert_eq!(ma[0], None);
        assert_relative_eq!(ma[1].unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(ma[5].unwrap(), 6.0, epsilon = 1e-12);
        assert_eq!(ma[6], None);
    }

    #[test]
    fn recovers_multiplicative_pattern() {
        let pattern = [0.8, 0.9, 1.0, 1.1, 1.2, 1.3, 1.2, 1.1, 1.0, 0.9, 0.8, 0.7];
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 * pattern[i % 12])
            .collect();
        let dec = Decomposition::fit(&values, 12, SeasonalType::Multiplicative).unwrap();
        let pattern_mean = pattern.iter().sum::<f64>() / 12.0;
        for (got, want) in dec.seasonal.iter().zip(pattern.iter()) {
            assert_relative_eq!(*got, want / pattern_mean, epsilon = 1e-6);
        }

        let preds = dec.predict(12);
        for (i, p) in preds.iter().enumerate() {
            assert_relative_eq!(*p, values[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn additive_trend_extrapolation() {
        let values: Vec<f64> = (0..36)
            .map(|i| 10.0 + 2.0 * i as f64 + if i % 12 < 6 { 5.0 } else { -5.0 })
            .collect();
        let dec = Decomposition::fit(&values, 12, SeasonalType::Additive).unwrap();
        assert_relative_eq!(dec.trend_line.slope, 2.0, epsilon = 1e-6);

        let preds = dec.predict(2);
        assert_relative_eq!(preds[0], 10.0 + 2.0 * 36.0 + 5.0, epsilon = 1e-6);
        assert_relative_eq!(preds[1], 10.0 + 2.0 * 37.0 + 5.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_short_history() {
        assert!(matches!(
            Decomposition::fit(&[1.0; 23], 12, SeasonalType::Additive),
            Err(ForecastError::InsufficientData { needed: 24, got: 23 })
        ));
    }
}
