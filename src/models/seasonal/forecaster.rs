//! Seasonal strategy with explicit method selection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{rounding, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::seasonal::backend::{BuiltinSeasonalBackend, SharedSeasonalBackend};
use crate::models::seasonal::{naive, SeasonalType};
use crate::models::traits::{check_horizon, ForecastStrategy};

/// Length of the seasonal cycle: twelve calendar months.
pub const SEASON_LENGTH: usize = 12;

/// History needed before Holt-Winters or decomposition are considered.
pub const MIN_ADVANCED_HISTORY: usize = 2 * SEASON_LENGTH;

/// Seasonal forecasting method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalMethod {
    /// Best available method for the history length and backend.
    #[default]
    Auto,
    /// Damped Holt-Winters smoothing.
    HoltWinters,
    /// Classical decomposition with linear trend extrapolation.
    Decomposition,
    /// Seasonal indices with a damped linear trend.
    Naive,
}

impl SeasonalMethod {
    fn as_str(self) -> &'static str {
        match self {
            SeasonalMethod::Auto => "auto",
            SeasonalMethod::HoltWinters => "holt_winters",
            SeasonalMethod::Decomposition => "decomposition",
            SeasonalMethod::Naive => "naive",
        }
    }
}

impl fmt::Display for SeasonalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonalMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(SeasonalMethod::Auto),
            "holt_winters" => Ok(SeasonalMethod::HoltWinters),
            "decomposition" => Ok(SeasonalMethod::Decomposition),
            "naive" => Ok(SeasonalMethod::Naive),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown seasonal method '{other}'"
            ))),
        }
    }
}

/// Resolve the method to run first for a history of length `n`.
///
/// Advanced methods need [`MIN_ADVANCED_HISTORY`] points and an available
/// backend; otherwise the naive method is selected. `Auto` prefers
/// Holt-Winters.
pub fn select_method(
    requested: SeasonalMethod,
    n: usize,
    backend_available: bool,
) -> SeasonalMethod {
    if requested == SeasonalMethod::Naive || n < MIN_ADVANCED_HISTORY || !backend_available {
        return SeasonalMethod::Naive;
    }
    match requested {
        SeasonalMethod::Auto => SeasonalMethod::HoltWinters,
        other => other,
    }
}

/// Seasonal forecaster.
///
/// Escalation order for [`SeasonalMethod::Auto`] is Holt-Winters, then
/// decomposition, then naive. An explicitly requested advanced method falls
/// back straight to naive. Every fallback is recorded on the returned
/// [`Forecast`]; none is reported as an error.
#[derive(Debug, Clone)]
pub struct SeasonalForecast {
    method: SeasonalMethod,
    seasonal_type: SeasonalType,
    backend: SharedSeasonalBackend,
    name: String,
}

impl SeasonalForecast {
    /// Create a forecaster for `method` using the built-in backend.
    pub fn new(method: SeasonalMethod) -> Self {
        Self {
            method,
            seasonal_type: SeasonalType::default(),
            backend: Arc::new(BuiltinSeasonalBackend),
            name: format!("Seasonal({method})"),
        }
    }

    pub fn auto() -> Self {
        Self::new(SeasonalMethod::Auto)
    }

    pub fn naive() -> Self {
        Self::new(SeasonalMethod::Naive)
    }

    /// Set the seasonal type used by the advanced methods.
    pub fn with_seasonal_type(mut self, seasonal_type: SeasonalType) -> Self {
        self.seasonal_type = seasonal_type;
        self
    }

    /// Wire in a different advanced-method backend.
    pub fn with_backend(mut self, backend: SharedSeasonalBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Get the requested method.
    pub fn method(&self) -> SeasonalMethod {
        self.method
    }

    /// Get the seasonal type.
    pub fn seasonal_type(&self) -> SeasonalType {
        self.seasonal_type
    }

    /// Seasonal index for each calendar position `0..12`.
    pub fn get_seasonality_pattern(&self, history: &[f64]) -> BTreeMap<usize, f64> {
        naive::seasonal_indices(history, SEASON_LENGTH)
            .into_iter()
            .enumerate()
            .collect()
    }

    fn run_advanced(
        &self,
        method: SeasonalMethod,
        history: &[f64],
        horizon: usize,
    ) -> Result<Vec<f64>> {
        let raw = match method {
            SeasonalMethod::HoltWinters => {
                self.backend
                    .holt_winters(history, horizon, SEASON_LENGTH, self.seasonal_type)?
            }
            SeasonalMethod::Decomposition => {
                self.backend
                    .decomposition(history, horizon, SEASON_LENGTH, self.seasonal_type)?
            }
            _ => return Ok(naive::project(history, horizon, SEASON_LENGTH)),
        };
        if raw.len() != horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: raw.len(),
            });
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(format!(
                "{method} produced non-finite values"
            )));
        }
        Ok(raw)
    }

    fn method_label(method: SeasonalMethod) -> String {
        format!("Seasonal({method})")
    }
}

impl Default for SeasonalForecast {
    fn default() -> Self {
        Self::auto()
    }
}

impl ForecastStrategy for SeasonalForecast {
    fn forecast(&self, history: &[f64], horizon: usize, precision: u32) -> Result<Forecast> {
        check_horizon(horizon)?;
        if let Some(zero) = self.handle_insufficient_data(history, horizon, precision) {
            return Ok(zero);
        }

        let n = history.len();
        let available = self.backend.is_available();
        let first = select_method(self.method, n, available);
        tracing::debug!(
            requested = %self.method,
            selected = %first,
            n,
            backend = self.backend.name(),
            "seasonal method selected"
        );

        let mut reasons = Vec::new();
        if first == SeasonalMethod::Naive
            && matches!(self.method, SeasonalMethod::HoltWinters | SeasonalMethod::Decomposition)
        {
            reasons.push(if n < MIN_ADVANCED_HISTORY {
                ForecastError::InsufficientData {
                    needed: MIN_ADVANCED_HISTORY,
                    got: n,
                }
                .to_string()
            } else {
                ForecastError::BackendUnavailable(self.backend.name().to_string()).to_string()
            });
        }

        let chain: &[SeasonalMethod] = match (self.method, first) {
            (_, SeasonalMethod::Naive) => &[],
            (SeasonalMethod::Auto, _) => {
                &[SeasonalMethod::HoltWinters, SeasonalMethod::Decomposition]
            }
            (_, SeasonalMethod::HoltWinters) => &[SeasonalMethod::HoltWinters],
            (_, _) => &[SeasonalMethod::Decomposition],
        };

        for &method in chain {
            match self.run_advanced(method, history, horizon) {
                Ok(raw) => {
                    let label = Self::method_label(method);
                    let fc = rounding::finalized_forecast(&raw, precision, &label);
                    return Ok(if reasons.is_empty() {
                        fc
                    } else {
                        fc.with_fallback_reason(reasons.join("; "))
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        method = %method,
                        reason = %err,
                        "seasonal method failed, falling back"
                    );
                    reasons.push(format!("{method}: {err}"));
                }
            }
        }

        let raw = naive::project(history, horizon, SEASON_LENGTH);
        let label = Self::method_label(SeasonalMethod::Naive);
        let fc = rounding::finalized_forecast(&raw, precision, &label);
        Ok(if reasons.is_empty() {
            fc
        } else {
            fc.with_fallback_reason(reasons.join("; "))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
