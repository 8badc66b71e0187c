//! Pluggable provider of the long-history seasonal methods.
//!
//! [`SeasonalForecast`](super::SeasonalForecast) only escalates beyond the
//! naive method when a backend reports itself available. The backend is
//! chosen when the forecaster is built, never probed at runtime.

use std::fmt;
use std::sync::Arc;

use crate::error::{ForecastError, Result};
use crate::models::seasonal::{Decomposition, HoltWintersFit, SeasonalType};

/// Capability providing Holt-Winters and decomposition forecasts.
///
/// Implementations return raw (unclamped, unrounded) projections of length
/// `horizon`; any `Err` makes the caller fall back to the next method.
pub trait SeasonalBackend: Send + Sync + fmt::Debug {
    /// Backend name.
    fn name(&self) -> &str;

    /// Whether the advanced methods can be used at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Holt-Winters with an additive damped trend.
    fn holt_winters(
        &self,
        history: &[f64],
        horizon: usize,
        period: usize,
        seasonal_type: SeasonalType,
    ) -> Result<Vec<f64>>;

    /// Classical decomposition with linear trend extrapolation.
    fn decomposition(
        &self,
        history: &[f64],
        horizon: usize,
        period: usize,
        seasonal_type: SeasonalType,
    ) -> Result<Vec<f64>>;
}

/// Shared handle to a backend.
pub type SharedSeasonalBackend = Arc<dyn SeasonalBackend>;

/// The in-crate implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSeasonalBackend;

impl SeasonalBackend for BuiltinSeasonalBackend {
    fn name(&self) -> &str {
        "builtin"
    }

    fn holt_winters(
        &self,
        history: &[f64],
        horizon: usize,
        period: usize,
        seasonal_type: SeasonalType,
    ) -> Result<Vec<f64>> {
        let fit = HoltWintersFit::optimized(history, period, seasonal_type)?;
        Ok(fit.predict(horizon))
    }

    fn decomposition(
        &self,
        history: &[f64],
        horizon: usize,
        period: usize,
        seasonal_type: SeasonalType,
    ) -> Result<Vec<f64>> {
        let dec = Decomposition::fit(history, period, seasonal_type)?;
        Ok(dec.predict(horizon))
    }
}

/// A backend that offers nothing, restricting forecasts to the naive method.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveOnlyBackend;

impl SeasonalBackend for NaiveOnlyBackend {
    fn name(&self) -> &str {
        "naive-only"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn holt_winters(&self, _: &[f64], _: usize, _: usize, _: SeasonalType) -> Result<Vec<f64>> {
        Err(ForecastError::BackendUnavailable("holt-winters".into()))
    }

    fn decomposition(&self, _: &[f64], _: usize, _: usize, _: SeasonalType) -> Result<Vec<f64>> {
        Err(ForecastError::BackendUnavailable("decomposition".into()))
    }
}
