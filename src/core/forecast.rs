//! Forecast result structure for holding predictions.

use serde::{Deserialize, Serialize};

/// A forecast result: point predictions plus the metadata describing how
/// they were produced.
///
/// Values are always finite, non-negative and already rounded to
/// [`precision`](Forecast::precision) decimals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    /// Point predictions, one per forecast step.
    values: Vec<f64>,
    /// Number of decimals the values were rounded to.
    precision: u32,
    /// Name of the method that actually produced the values.
    method: String,
    /// Why a fallback method was used instead of the requested one.
    fallback_reason: Option<String>,
}

impl Forecast {
    /// Create a forecast from already finalized values.
    pub fn new(values: Vec<f64>, precision: u32, method: impl Into<String>) -> Self {
        Self {
            values,
            precision,
            method: method.into(),
            fallback_reason: None,
        }
    }

    /// Attach the reason a fallback path was taken.
    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = Some(reason.into());
        self
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the point predictions.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the forecast and return its point predictions.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of decimals the values were rounded to.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Whether the values are whole numbers (precision 0).
    pub fn is_integral(&self) -> bool {
        self.precision == 0
    }

    /// Integer rendering of the values, for count forecasts.
    ///
    /// Values are rounded to the nearest integer regardless of precision.
    pub fn to_counts(&self) -> Vec<i64> {
        self.values.iter().map(|v| v.round() as i64).collect()
    }

    /// Name of the method that produced the values.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Reason a fallback was used, if any.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    /// Whether the forecast came from a fallback path.
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    /// Sum of all point predictions.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}
