//! Holt-Winters smoothing with an additive damped trend.
//!
//! Model equations with damping `φ`, for multiplicative seasonality:
//! - Level: `l_t = α(y_t / s_{t-m}) + (1-α)(l_{t-1} + φ b_{t-1})`
//! - Trend: `b_t = β(l_t - l_{t-1}) + (1-β) φ b_{t-1}`
//! - Seasonal: `s_t = γ(y_t / l_t) + (1-γ)s_{t-m}`
//! - Forecast: `ŷ_{t+h} = (l_t + (φ + φ² + … + φ^h) b_t) s_{t+h-m}`
//!
//! The additive variant replaces the divisions by subtractions and the final
//! product by a sum.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::utils::optimization::{minimize_bounded, SimplexConfig};

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalType {
    /// Multiplicative seasonality: `y_t = (l_t + b_t) * s_t + e_t`
    #[default]
    Multiplicative,
    /// Additive seasonality: `y_t = l_t + b_t + s_t + e_t`
    Additive,
}

const SMOOTHING_BOUNDS: (f64, f64) = (0.01, 0.99);
const DAMPING_BOUNDS: (f64, f64) = (0.8, 0.98);

/// Smoothing parameters of a damped Holt-Winters model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub phi: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.1,
            phi: 0.9,
        }
    }
}

/// Final smoothing state after a pass over the history.
#[derive(Debug, Clone)]
pub struct HoltWintersFit {
    params: SmoothingParams,
    seasonal_type: SeasonalType,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    n: usize,
    sse: f64,
}

impl HoltWintersFit {
    /// Fit with parameters chosen by bounded Nelder-Mead on the one-step SSE.
    pub fn optimized(values: &[f64], period: usize, seasonal_type: SeasonalType) -> Result<Self> {
        check_input(values, period, seasonal_type)?;

        let start = SmoothingParams::default();
        let best = minimize_bounded(
            |p| {
                let params = SmoothingParams {
                    alpha: p[0],
                    beta: p[1],
                    gamma: p[2],
                    phi: p[3],
                };
                run(values, period, seasonal_type, params)
                    .map(|fit| fit.sse)
                    .unwrap_or(f64::MAX)
            },
            &[start.alpha, start.beta, start.gamma, start.phi],
            &[
                SMOOTHING_BOUNDS,
                SMOOTHING_BOUNDS,
                SMOOTHING_BOUNDS,
                DAMPING_BOUNDS,
            ],
            &SimplexConfig::default(),
        );

        let params = SmoothingParams {
            alpha: best.point[0],
            beta: best.point[1],
            gamma: best.point[2],
            phi: best.point[3],
        };
        tracing::trace!(
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            phi = params.phi,
            iterations = best.iterations,
            "holt-winters parameters optimized"
        );
        run(values, period, seasonal_type, params)
    }

    /// Fit with fixed parameters.
    pub fn with_params(
        values: &[f64],
        period: usize,
        seasonal_type: SeasonalType,
        params: SmoothingParams,
    ) -> Result<Self> {
        check_input(values, period, seasonal_type)?;
        run(values, period, seasonal_type, params)
    }

    /// Get the smoothing parameters used.
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// Get the seasonal factors, indexed by position in the cycle.
    pub fn seasonals(&self) -> &[f64] {
        &self.seasonals
    }

    /// Sum of squared one-step-ahead errors.
    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Project `horizon` steps past the end of the history.
    pub fn predict(&self, horizon: usize) -> Vec<f64> {
        let period = self.seasonals.len();
        let phi = self.params.phi;
        let mut damped_sum = 0.0;
        let mut phi_h = 1.0;

        (1..=horizon)
            .map(|h| {
                phi_h *= phi;
                damped_sum += phi_h;
                let s = self.seasonals[(self.n + h - 1) % period];
                let base = self.level + damped_sum * self.trend;
                match self.seasonal_type {
                    SeasonalType::Additive => base + s,
                    SeasonalType::Multiplicative => base * s,
                }
            })
            .collect()
    }
}

fn check_input(values: &[f64], period: usize, seasonal_type: SeasonalType) -> Result<()> {
    if period < 2 {
        return Err(ForecastError::InvalidParameter(
            "seasonal period must be at least 2".into(),
        ));
    }
    if values.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: values.len(),
        });
    }
    if seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::ComputationError(
            "multiplicative seasonality requires strictly positive data".into(),
        ));
    }
    Ok(())
}

/// Initial level, trend and seasonal factors from the first two cycles.
///
/// The level is placed at the end of the first cycle, where the recursion
/// picks up. Seasonal factors are taken from the first cycle after removing
/// the linear trend between the two cycle means.
fn initial_state(
    values: &[f64],
    period: usize,
    seasonal_type: SeasonalType,
) -> (f64, f64, Vec<f64>) {
    let first = &values[..period];
    let second = &values[period..2 * period];
    let first_mean = first.iter().sum::<f64>() / period as f64;
    let second_mean = second.iter().sum::<f64>() / period as f64;
    let trend = (second_mean - first_mean) / period as f64;
    let center = (period - 1) as f64 / 2.0;

    let mut seasonals: Vec<f64> = first
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let local = first_mean + trend * (i as f64 - center);
            match seasonal_type {
                SeasonalType::Additive => y - local,
                SeasonalType::Multiplicative if local.abs() > 1e-10 => y / local,
                SeasonalType::Multiplicative => 1.0,
            }
        })
        .collect();

    // Additive factors sum to 0, multiplicative factors average to 1.
    let avg = seasonals.iter().sum::<f64>() / period as f64;
    match seasonal_type {
        SeasonalType::Additive => seasonals.iter_mut().for_each(|s| *s -= avg),
        SeasonalType::Multiplicative if avg.abs() > 1e-10 => {
            seasonals.iter_mut().for_each(|s| *s /= avg)
        }
        SeasonalType::Multiplicative => {}
    }

    let level = first_mean + trend * center;
    (level, trend, seasonals)
}

fn run(
    values: &[f64],
    period: usize,
    seasonal_type: SeasonalType,
    params: SmoothingParams,
) -> Result<HoltWintersFit> {
    let SmoothingParams {
        alpha,
        beta,
        gamma,
        phi,
    } = params;
    let (mut level, mut trend, mut seasonals) = initial_state(values, period, seasonal_type);
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate().skip(period) {
        let idx = t % period;
        let s = seasonals[idx];
        let damped = phi * trend;

        let fitted = match seasonal_type {
            SeasonalType::Additive => level + damped + s,
            SeasonalType::Multiplicative => (level + damped) * s,
        };
        sse += (y - fitted).powi(2);

        let prev = level;
        match seasonal_type {
            SeasonalType::Additive => {
                level = alpha * (y - s) + (1.0 - alpha) * (prev + damped);
                trend = beta * (level - prev) + (1.0 - beta) * damped;
                seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
            }
            SeasonalType::Multiplicative => {
                let deseasonalized = if s.abs() > 1e-10 { y / s } else { y };
                level = alpha * deseasonalized + (1.0 - alpha) * (prev + damped);
                trend = beta * (level - prev) + (1.0 - beta) * damped;
                if level.abs() > 1e-10 {
                    seasonals[idx] = gamma * (y / level) + (1.0 - gamma) * s;
                }
            }
        }
    }

    if !(level.is_finite() && trend.is_finite() && sse.is_finite())
        || seasonals.iter().any(|s| !s.is_finite())
    {
        return Err(ForecastError::ComputationError(
            "holt-winters state diverged".into(),
        ));
    }

    Ok(HoltWintersFit {
        params,
        seasonal_type,
        level,
        trend,
        seasonals,
        n: values.len(),
        sse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_data(n: usize, period: usize, trend: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let phase = 2.0 * std::f64::consts::PI * t / period as f64;
                100.0 + trend * t + amplitude * phase.sin()
            })
            .collect()
    }

    #[test]
    fn optimized_fit_forecasts_horizon() {
        let values = seasonal_data(48, 12, 0.5, 10.0);
        let fit = HoltWintersFit::optimized(&values, 12, SeasonalType::Multiplicative).unwrap();
        let preds = fit.predict(12);
        assert_eq!(preds.len(), 12);
        assert!(preds.iter().all(|p| p.is_finite() && *p > 0.0));

        let p = fit.params();
        assert!((0.01..=0.99).contains(&p.alpha));
        assert!((0.8..=0.98).contains(&p.phi));
    }

    #[test]
    fn captures_seasonal_shape() {
        // Peak in the fourth month of each cycle.
        let values: Vec<f64> = (0..36)
            .map(|i| if i % 12 == 3 { 40.0 } else { 20.0 })
            .collect();
        let fit = HoltWintersFit::optimized(&values, 12, SeasonalType::Additive).unwrap();
        let preds = fit.predict(12);
        let peak = preds
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 3);
    }

    #[test]
    fn constant_series_is_flat() {
        let values = vec![50.0; 30];
        let fit = HoltWintersFit::with_params(
            &values,
            12,
            SeasonalType::Multiplicative,
            SmoothingParams::default(),
        )
        .unwrap();
        for p in fit.predict(6) {
            assert_relative_eq!(p, 50.0, epsilon = 1e-9);
        }
        assert_relative_eq!(fit.sse(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn multiplicative_rejects_non_positive() {
        let mut values = seasonal_data(30, 12, 0.0, 5.0);
        values[4] = 0.0;
        assert!(matches!(
            HoltWintersFit::optimized(&values, 12, SeasonalType::Multiplicative),
            Err(ForecastError::ComputationError(_))
        ));
        assert!(HoltWintersFit::optimized(&values, 12, SeasonalType::Additive).is_ok());
    }

    #[test]
    fn insufficient_data() {
        let values = vec![1.0; 20];
        assert!(matches!(
            HoltWintersFit::optimized(&values, 12, SeasonalType::Additive),
            Err(ForecastError::InsufficientData {
                needed: 24,
                got: 20
            })
        ));
    }

    #[test]
    fn initial_state_removes_trend() {
        let values: Vec<f64> = (0..24).map(|i| 100.0 + 3.0 * i as f64).collect();
        for seasonal_type in [SeasonalType::Additive, SeasonalType::Multiplicative] {
            let (level, trend, seasonals) = initial_state(&values, 12, seasonal_type);
            // level sits on the last point of the first cycle
            assert_relative_eq!(level, 133.0, epsilon = 1e-9);
            assert_relative_eq!(trend, 3.0, epsilon = 1e-9);
            let neutral = match seasonal_type {
                SeasonalType::Additive => 0.0,
                SeasonalType::Multiplicative => 1.0,
            };
            for s in seasonals {
                assert_relative_eq!(s, neutral, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn linear_series_keeps_growing() {
        let values: Vec<f64> = (0..36).map(|i| 100.0 + 3.0 * i as f64).collect();
        for seasonal_type in [SeasonalType::Additive, SeasonalType::Multiplicative] {
            let fit = HoltWintersFit::optimized(&values, 12, seasonal_type).unwrap();
            for p in fit.predict(6) {
                assert!(p >= 205.0, "{seasonal_type:?} forecast {p} below last value");
            }
        }
    }

    #[test]
    fn seasonal_factors_normalized() {
        let values = seasonal_data(24, 12, 0.0, 10.0);
        let fit = HoltWintersFit::with_params(
            &values,
            12,
            SeasonalType::Additive,
            SmoothingParams {
                gamma: 0.01,
                ..Default::default()
            },
        )
        .unwrap();
        let sum: f64 = fit.seasonals().iter().sum();
        assert!(sum.abs() < 1.0);
    }
}
