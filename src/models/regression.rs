//! Regression on the time index.
//!
//! The only predictor is the position `t = 0..n-1` of each observation; the
//! fitted model is evaluated at `t = n..n+horizon-1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{rounding, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_horizon, ForecastStrategy};
use crate::utils::fit_columns;

/// L2 penalty used by [`RegressionKind::Ridge`].
pub const RIDGE_ALPHA: f64 = 1.0;

/// Minimum history needed before a regression is attempted.
pub const MIN_REGRESSION_POINTS: usize = 3;

/// Regression family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionKind {
    /// Ordinary least squares, `y = a t + b`.
    #[default]
    Linear,
    /// L2-regularized linear fit with penalty [`RIDGE_ALPHA`].
    Ridge,
    /// Degree-2 polynomial features. Overfits easily on short series and
    /// extrapolates curvature aggressively.
    Polynomial,
}

impl RegressionKind {
    fn as_str(self) -> &'static str {
        match self {
            RegressionKind::Linear => "linear",
            RegressionKind::Ridge => "ridge",
            RegressionKind::Polynomial => "polynomial",
        }
    }

    fn features(self, t: &[f64]) -> Vec<Vec<f64>> {
        match self {
            RegressionKind::Linear | RegressionKind::Ridge => vec![t.to_vec()],
            RegressionKind::Polynomial => vec![t.to_vec(), t.iter().map(|v| v * v).collect()],
        }
    }

    fn penalty(self) -> f64 {
        match self {
            RegressionKind::Ridge => RIDGE_ALPHA,
            _ => 0.0,
        }
    }
}

impl fmt::Display for RegressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegressionKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(RegressionKind::Linear),
            "ridge" => Ok(RegressionKind::Ridge),
            "polynomial" | "poly" => Ok(RegressionKind::Polynomial),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown regression kind '{other}'"
            ))),
        }
    }
}

/// Time-index regression forecaster.
///
/// Falls back to repeating the historical mean when fewer than
/// [`MIN_REGRESSION_POINTS`] observations exist or when the fit fails.
#[derive(Debug, Clone)]
pub struct MachineLearningForecast {
    kind: RegressionKind,
    name: String,
}

impl MachineLearningForecast {
    /// Create a forecaster of the given kind.
    pub fn new(kind: RegressionKind) -> Self {
        Self {
            kind,
            name: format!("Regression({kind})"),
        }
    }

    pub fn linear() -> Self {
        Self::new(RegressionKind::Linear)
    }

    pub fn ridge() -> Self {
        Self::new(RegressionKind::Ridge)
    }

    pub fn polynomial() -> Self {
        Self::new(RegressionKind::Polynomial)
    }

    /// Get the regression kind.
    pub fn kind(&self) -> RegressionKind {
        self.kind
    }

    /// Fit on `history` and evaluate at the next `horizon` indices.
    fn project(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let n = history.len();
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let beta = fit_columns(&self.kind.features(&t), history, self.kind.penalty())?;

        let future: Vec<f64> = (n..n + horizon).map(|i| i as f64).collect();
        let columns = self.kind.features(&future);
        let raw: Vec<f64> = (0..horizon)
            .map(|step| {
                beta[0]
                    + columns
                        .iter()
                        .zip(&beta[1..])
                        .map(|(col, b)| b * col[step])
                        .sum::<f64>()
            })
            .collect();

        if raw.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "regression produced non-finite predictions".into(),
            ));
        }
        Ok(raw)
    }
}

impl Default for MachineLearningForecast {
    fn default() -> Self {
        Self::linear()
    }
}

impl ForecastStrategy for MachineLearningForecast {
    fn forecast(&self, history: &[f64], horizon: usize, precision: u32) -> Result<Forecast> {
        check_horizon(horizon)?;
        if let Some(zero) = self.handle_insufficient_data(history, horizon, precision) {
            return Ok(zero);
        }

        if history.len() < MIN_REGRESSION_POINTS {
            let err = ForecastError::InsufficientData {
                needed: MIN_REGRESSION_POINTS,
                got: history.len(),
            };
            tracing::debug!(strategy = %self.name, n = history.len(), "too short, repeating mean");
            return Ok(rounding::mean_forecast(history, horizon, precision, &self.name)
                .with_fallback_reason(err.to_string()));
        }

        match self.project(history, horizon) {
            Ok(raw) => Ok(rounding::finalized_forecast(&raw, precision, &self.name)),
            Err(err) => {
                tracing::warn!(
                    strategy = %self.name,
                    reason = %err,
                    "regression failed, repeating mean"
                );
                Ok(rounding::mean_forecast(history, horizon, precision, &self.name)
                    .with_fallback_reason(err.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_extrapolates_trend() {
        // y = 5 + 2t
        let history: Vec<f64> = (0..10).map(|t| 5.0 + 2.0 * t as f64).collect();
        let fc = MachineLearningForecast::linear()
            .forecast(&history, 3, 2)
            .unwrap();
        assert_relative_eq!(fc.values()[0], 25.0, epsilon = 1e-6);
        assert_relative_eq!(fc.values()[1], 27.0, epsilon = 1e-6);
        assert_relative_eq!(fc.values()[2], 29.0, epsilon = 1e-6);
        assert!(!fc.is_fallback());
    }

    #[test]
    fn ridge_is_flatter_than_linear() {
        let history: Vec<f64> = (0..4).map(|t| 10.0 + 4.0 * t as f64).collect();
        let linear = MachineLearningForecast::linear()
            .forecast(&history, 3, 4)
            .unwrap();
        let ridge = MachineLearningForecast::ridge()
            .forecast(&history, 3, 4)
            .unwrap();
        assert!(ridge.values()[2] < linear.values()[2]);
    }

    #[test]
    fn polynomial_fits_curvature() {
        // y = 1 + t^2
        let history: Vec<f64> = (0..8).map(|t| 1.0 + (t * t) as f64).collect();
        let fc = MachineLearningForecast::polynomial()
            .forecast(&history, 2, 3)
            .unwrap();
        assert_relative_eq!(fc.values()[0], 65.0, epsilon = 1e-3);
        assert_relative_eq!(fc.values()[1], 82.0, epsilon = 1e-3);
    }

    #[test]
    fn short_history_repeats_mean() {
        let fc = MachineLearningForecast::linear()
            .forecast(&[4.0, 8.0], 3, 0)
            .unwrap();
        assert_eq!(fc.values(), &[6.0, 6.0, 6.0]);
        assert!(fc.is_fallback());
    }

    #[test]
    fn failed_fit_repeats_mean() {
        let history = [12.0, 15.0, f64::NAN, 14.0, 18.0, 16.0];
        for kind in [
            RegressionKind::Linear,
            RegressionKind::Ridge,
            RegressionKind::Polynomial,
        ] {
            let fc = MachineLearningForecast::new(kind)
                .forecast(&history, 4, 1)
                .unwrap();
            assert_eq!(fc.horizon(), 4);
            assert!(fc.values().iter().all(|v| v.is_finite() && *v >= 0.0));
            assert!(fc.is_fallback(), "{kind}");
        }
    }

    #[test]
    fn downward_trend_clamped_at_zero() {
        let history = [50.0, 40.0, 30.0, 20.0, 10.0];
        let fc = MachineLearningForecast::linear()
            .forecast(&history, 4, 0)
            .unwrap();
        assert_eq!(fc.values(), &[0.0; 4]);
    }

    #[test]
    fn all_zero_history_gives_zeros() {
        let fc = MachineLearningForecast::polynomial()
            .forecast(&[0.0; 10], 2, 0)
            .unwrap();
        assert_eq!(fc.values(), &[0.0, 0.0]);
    }

    #[test]
    fn single_point_repeats_value() {
        let fc = MachineLearningForecast::ridge()
            .forecast(&[3.0], 2, 1)
            .unwrap();
        assert_eq!(fc.values(), &[3.0, 3.0]);
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("ridge".parse::<RegressionKind>().unwrap(), RegressionKind::Ridge);
        assert_eq!("poly".parse::<RegressionKind>().unwrap(), RegressionKind::Polynomial);
        assert!("lasso".parse::<RegressionKind>().is_err());
    }
}
