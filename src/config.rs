//! Forecasting configuration gathered in one serializable struct.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::models::claims::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_MAX_LAG};
use crate::models::{
    BoxedStrategy, ClaimsPredictor, MachineLearningForecast, RegressionKind, SeasonalForecast,
    SeasonalMethod, SeasonalType, StatisticalForecast, StatisticalPreset,
};

/// Default number of months forecast.
pub const DEFAULT_HORIZON: usize = 12;

/// Largest horizon accepted by [`ForecastConfig::validate`].
pub const MAX_HORIZON: usize = 120;

/// Largest precision accepted by [`ForecastConfig::validate`].
pub const MAX_PRECISION: u32 = 10;

/// Strategy family built by [`ForecastConfig::build_strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Statistical,
    MachineLearning,
    #[default]
    Seasonal,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Statistical => "statistical",
            Self::MachineLearning => "machine_learning",
            Self::Seasonal => "seasonal",
        })
    }
}

impl FromStr for StrategyKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "statistical" => Ok(Self::Statistical),
            "machine_learning" | "ml" | "regression" => Ok(Self::MachineLearning),
            "seasonal" => Ok(Self::Seasonal),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown strategy: {other}"
            ))),
        }
    }
}

/// Configuration for forecasting and claims prediction.
///
/// Every field has a default, so partial settings files deserialize.
///
/// # Example
///
/// ```
/// use claims_forecast::config::{ForecastConfig, StrategyKind};
/// use claims_forecast::models::ForecastStrategy;
///
/// let config = ForecastConfig::default()
///     .with_strategy(StrategyKind::Statistical)
///     .with_horizon(6);
/// let strategy = config.build_strategy().unwrap();
/// let forecast = strategy
///     .forecast(&[4.0, 6.0, 5.0, 7.0], config.horizon, config.precision)
///     .unwrap();
/// assert_eq!(forecast.horizon(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Months to forecast.
    pub horizon: usize,
    /// Decimals in the output; 0 yields whole numbers.
    pub precision: u32,
    pub strategy: StrategyKind,
    pub preset: StatisticalPreset,
    pub regression: RegressionKind,
    pub seasonal_method: SeasonalMethod,
    pub seasonal_type: SeasonalType,
    /// Confidence level of claims prediction bounds.
    pub confidence_level: f64,
    /// Fixed lag for claims prediction; `None` searches `0..=max_lag`.
    pub fixed_lag: Option<usize>,
    pub max_lag: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            precision: 0,
            strategy: StrategyKind::default(),
            preset: StatisticalPreset::default(),
            regression: RegressionKind::default(),
            seasonal_method: SeasonalMethod::default(),
            seasonal_type: SeasonalType::default(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            fixed_lag: None,
            max_lag: DEFAULT_MAX_LAG,
        }
    }
}

impl ForecastConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_preset(mut self, preset: StatisticalPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_regression(mut self, regression: RegressionKind) -> Self {
        self.regression = regression;
        self
    }

    pub fn with_seasonal_method(mut self, method: SeasonalMethod) -> Self {
        self.seasonal_method = method;
        self
    }

    pub fn with_seasonal_type(mut self, seasonal_type: SeasonalType) -> Self {
        self.seasonal_type = seasonal_type;
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn with_fixed_lag(mut self, lag: usize) -> Self {
        self.fixed_lag = Some(lag);
        self
    }

    pub fn with_max_lag(mut self, max_lag: u32) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Check that the knobs are usable.
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 || self.horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be in 1..={MAX_HORIZON}, got {}",
                self.horizon
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(ForecastError::InvalidParameter(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }

    /// Build the configured strategy.
    pub fn build_strategy(&self) -> Result<BoxedStrategy> {
        self.validate()?;
        tracing::debug!(strategy = %self.strategy, "building strategy");
        Ok(match self.strategy {
            StrategyKind::Statistical => Box::new(StatisticalForecast::new(self.preset)),
            StrategyKind::MachineLearning => {
                Box::new(MachineLearningForecast::new(self.regression))
            }
            StrategyKind::Seasonal => Box::new(
                SeasonalForecast::new(self.seasonal_method).with_seasonal_type(self.seasonal_type),
            ),
        })
    }

    /// Build a claims predictor over the given history.
    pub fn build_predictor(
        &self,
        reclamations: impl Into<Vec<f64>>,
        claim_counts: impl Into<Vec<f64>>,
        claim_sums: impl Into<Vec<f64>>,
    ) -> Result<ClaimsPredictor> {
        self.validate()?;
        let predictor = ClaimsPredictor::new(reclamations, claim_counts, claim_sums)
            .with_confidence_level(self.confidence_level)
            .with_max_lag(self.max_lag);
        Ok(match self.fixed_lag {
            Some(lag) => predictor.with_fixed_lag(lag),
            None => predictor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastStrategy;

    #[test]
    fn defaults_are_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon, 12);
        assert_eq!(config.precision, 0);
        assert_eq!(config.strategy, StrategyKind::Seasonal);
    }

    #[test]
    fn validate_rejects_bad_knobs() {
        assert!(ForecastConfig::default().with_horizon(0).validate().is_err());
        assert!(ForecastConfig::default().with_horizon(500).validate().is_err());
        assert!(ForecastConfig::default().with_precision(11).validate().is_err());
        assert!(ForecastConfig::default()
            .with_confidence_level(1.5)
            .validate()
            .is_err());
        assert!(ForecastConfig::default()
            .with_confidence_level(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn builds_each_strategy() {
        let base = ForecastConfig::default();
        let s = base
            .clone()
            .with_strategy(StrategyKind::Statistical)
            .with_preset(StatisticalPreset::Aggressive)
            .build_strategy()
            .unwrap();
        assert_eq!(s.name(), "Statistical(aggressive)");

        let s = base
            .clone()
            .with_strategy(StrategyKind::MachineLearning)
            .with_regression(RegressionKind::Ridge)
            .build_strategy()
            .unwrap();
        assert_eq!(s.name(), "Regression(ridge)");

        let s = base.with_seasonal_method(SeasonalMethod::Naive).build_strategy().unwrap();
        assert_eq!(s.name(), "Seasonal(naive)");
    }

    #[test]
    fn strategy_kind_parses() {
        assert_eq!("ml".parse::<StrategyKind>().unwrap(), StrategyKind::MachineLearning);
        assert_eq!(
            "Machine-Learning".parse::<StrategyKind>().unwrap(),
            StrategyKind::MachineLearning
        );
        assert!("arima".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn deserializes_partial_settings() {
        let config: ForecastConfig =
            serde_json::from_str(r#"{"horizon": 6, "strategy": "statistical", "fixed_lag": 2}"#)
                .unwrap();
        assert_eq!(config.horizon, 6);
        assert_eq!(config.strategy, StrategyKind::Statistical);
        assert_eq!(config.fixed_lag, Some(2));
        assert_eq!(config.max_lag, DEFAULT_MAX_LAG);
    }

    #[test]
    fn predictor_receives_knobs() {
        let p = ForecastConfig::default()
            .with_confidence_level(0.99)
            .build_predictor(vec![1.0, 2.0], vec![1.0, 1.0], vec![10.0, 20.0])
            .unwrap();
        assert_eq!(p.confidence_level(), 0.99);
    }
}
