//! # claims-forecast
//!
//! Monthly forecasting of warranty claims from reclamation history.
//!
//! Provides interchangeable forecasting strategies (statistical smoothing,
//! regression over time and seasonal methods with Holt-Winters and classical
//! decomposition), lag-correlation analysis between two series, and a claims
//! predictor that turns reclamation counts into expected claim sums with
//! confidence bounds.
//!
//! Every strategy returns non-negative values of exactly the requested
//! horizon, and degrades to a simpler method instead of failing when the
//! history is too short or a fit does not converge.
//!
//! ```
//! use claims_forecast::prelude::*;
//!
//! let history = [12.0, 15.0, 11.0, 18.0, 20.0, 17.0];
//! let forecast = StatisticalForecast::balanced().forecast(&history, 3, 0).unwrap();
//! assert_eq!(forecast.horizon(), 3);
//! assert!(forecast.is_integral());
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod correlation;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::{ForecastConfig, StrategyKind};
    pub use crate::core::Forecast;
    pub use crate::correlation::TimeSeriesCorrelation;
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{
        BoxedStrategy, ClaimPrediction, ClaimsPredictor, ForecastStrategy,
        MachineLearningForecast, SeasonalForecast, StatisticalForecast,
    };
}
