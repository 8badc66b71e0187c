//! ForecastStrategy trait defining the common contract for all forecasters.

use crate::core::{rounding, Forecast};
use crate::error::{ForecastError, Result};

/// Common interface for all forecasting strategies.
///
/// Strategies are stateless between calls: `forecast` takes the history
/// every time. The trait is object-safe and can be used with
/// `Box<dyn ForecastStrategy>`.
///
/// Contract shared by every implementation:
/// - the result has exactly `horizon` values;
/// - values are non-negative and rounded to `precision` decimals
///   (whole numbers for precision 0);
/// - empty or all-zero history yields an all-zero forecast, never an error;
/// - only `horizon == 0` is reported as an error.
pub trait ForecastStrategy: Send + Sync {
    /// Project `horizon` future values from `history`.
    fn forecast(&self, history: &[f64], horizon: usize, precision: u32) -> Result<Forecast>;

    /// Get the strategy name.
    fn name(&self) -> &str;

    /// Check whether `history` can be forecast at all.
    ///
    /// Fails with [`ForecastError::EmptyData`] for an empty series and
    /// [`ForecastError::AllZero`] when every value is exactly zero.
    fn validate(&self, history: &[f64]) -> Result<()> {
        validate_history(history)
    }

    /// Return the flat zero forecast when `history` fails validation.
    ///
    /// `None` means the history is usable and the strategy should proceed.
    fn handle_insufficient_data(
        &self,
        history: &[f64],
        horizon: usize,
        precision: u32,
    ) -> Option<Forecast> {
        self.validate(history).err().map(|err| {
            tracing::debug!(strategy = self.name(), reason = %err, "returning zero forecast");
            rounding::zero_forecast(horizon, precision, self.name())
                .with_fallback_reason(err.to_string())
        })
    }
}

/// Type alias for boxed strategy trait objects.
///
/// # Example
///
/// ```
/// use claims_forecast::models::{BoxedStrategy, ForecastStrategy};
/// use claims_forecast::models::StatisticalForecast;
///
/// let model: BoxedStrategy = Box::new(StatisticalForecast::balanced());
/// assert_eq!(model.name(), "Statistical(balanced)");
/// ```
pub type BoxedStrategy = Box<dyn ForecastStrategy>;

/// Validation shared by every strategy.
pub fn validate_history(history: &[f64]) -> Result<()> {
    if history.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if history.iter().all(|&v| v == 0.0) {
        return Err(ForecastError::AllZero);
    }
    Ok(())
}

/// Reject a zero horizon.
pub(crate) fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineLearningForecast, SeasonalForecast, StatisticalForecast};

    #[test]
    fn validate_rejects_empty_and_all_zero() {
        assert_eq!(validate_history(&[]), Err(ForecastError::EmptyData));
        assert_eq!(validate_history(&[0.0, 0.0]), Err(ForecastError::AllZero));
        assert!(validate_history(&[0.0, 1.0]).is_ok());
        assert!(validate_history(&[-2.0]).is_ok());
    }

    #[test]
    fn insufficient_data_gives_zero_forecast() {
        let model = StatisticalForecast::balanced();
        let fc = model.handle_insufficient_data(&[0.0; 6], 4, 0).unwrap();
        assert_eq!(fc.values(), &[0.0; 4]);
        assert!(fc.is_integral());
        assert_eq!(fc.fallback_reason(), Some("all values are zero"));

        let fc = model.handle_insufficient_data(&[], 2, 2).unwrap();
        assert_eq!(fc.values(), &[0.0; 2]);
        assert!(!fc.is_integral());
    }

    #[test]
    fn valid_history_proceeds() {
        let model = StatisticalForecast::balanced();
        assert!(model.handle_insufficient_data(&[1.0, 2.0], 3, 0).is_none());
    }

    #[test]
    fn boxed_strategies_share_contract() {
        let strategies: Vec<BoxedStrategy> = vec![
            Box::new(StatisticalForecast::balanced()),
            Box::new(MachineLearningForecast::linear()),
            Box::new(SeasonalForecast::auto()),
        ];
        let history = [4.0, 6.0, 5.0, 7.0, 8.0, 6.0, 9.0];
        for strategy in &strategies {
            let fc = strategy.forecast(&history, 5, 0).unwrap();
            assert_eq!(fc.horizon(), 5, "{}", strategy.name());
            assert!(fc.values().iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let model: BoxedStrategy = Box::new(StatisticalForecast::balanced());
        assert!(matches!(
            model.forecast(&[1.0, 2.0], 0, 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
