//! Core data structures for forecast results.

mod forecast;
pub mod rounding;

pub use forecast::Forecast;
pub use rounding::{finalize, mean_forecast, round_to, zero_forecast};
