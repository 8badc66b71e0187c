//! Seasonal forecasting.
//!
//! This module provides monthly seasonal forecasting that escalates with the
//! amount of history available:
//! - Naive seasonal indices with a damped trend (any length)
//! - Holt-Winters with an additive damped trend (two cycles or more)
//! - Classical decomposition with linear trend extrapolation (two cycles or more)

mod backend;
mod decomposition;
mod forecaster;
mod holt_winters;
pub mod naive;

pub use backend::{
    BuiltinSeasonalBackend, NaiveOnlyBackend, SeasonalBackend, SharedSeasonalBackend,
};
pub use decomposition::Decomposition;
pub use forecaster::{
    select_method, SeasonalForecast, SeasonalMethod, MIN_ADVANCED_HISTORY, SEASON_LENGTH,
};
pub use holt_winters::{HoltWintersFit, SeasonalType, SmoothingParams};
