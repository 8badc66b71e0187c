//! Utility functions for forecasting models.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{fit_columns, linear_fit, trend_slope, LinearFit};
pub use optimization::{minimize_bounded, Minimum, SimplexConfig};
pub use stats::{filter_outliers, mean, pearson, population_std};
