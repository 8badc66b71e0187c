//! Forecasting models.
//!
//! Every model implements [`ForecastStrategy`]: statistical smoothing,
//! regression over time, seasonal forecasting and the claims predictor that
//! turns reclamation history into claim sums.

mod traits;

pub mod claims;
pub mod regression;
pub mod seasonal;
pub mod statistical;

pub use claims::{
    ClaimPrediction, ClaimsPredictor, CoefficientSummary, FullAnalysis, ModelCoefficients,
};
pub use regression::{MachineLearningForecast, RegressionKind};
pub use seasonal::{SeasonalForecast, SeasonalMethod, SeasonalType};
pub use statistical::{PresetParams, StatisticalForecast, StatisticalPreset};
pub use traits::{validate_history, BoxedStrategy, ForecastStrategy};
