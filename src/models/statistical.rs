//! Moving-average plus damped-trend baseline forecaster.
//!
//! The forecast for step `i` (0-indexed) blends a stable component with a
//! trend-adjusted one:
//!
//! ```text
//! base      = mean(last ma_window values)
//! slope     = OLS slope over the last trend_window values
//! ŷ_{n+i}   = w_stable * base + w_trend * (base + slope * (i + 1) * damping^i)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{rounding, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::traits::{check_horizon, ForecastStrategy};
use crate::utils::{mean, trend_slope};

/// Tuning preset for [`StatisticalForecast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticalPreset {
    /// Long windows, little trend influence, strong damping.
    Conservative,
    /// 3-month average, 6-month trend, 70/30 blend.
    #[default]
    Balanced,
    /// Short windows, equal blend, weak damping.
    Aggressive,
}

/// Parameters fixed by a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetParams {
    /// Number of trailing points averaged into the base value.
    pub ma_window: usize,
    /// Number of trailing points used for the trend fit.
    pub trend_window: usize,
    /// Weight of the base value.
    pub weight_stable: f64,
    /// Weight of the trend-adjusted value.
    pub weight_trend: f64,
    /// Per-step multiplier applied to the trend contribution.
    pub damping: f64,
}

impl StatisticalPreset {
    /// Parameters for this preset.
    pub fn params(self) -> PresetParams {
        match self {
            StatisticalPreset::Conservative => PresetParams {
                ma_window: 6,
                trend_window: 12,
                weight_stable: 0.8,
                weight_trend: 0.2,
                damping: 0.85,
            },
            StatisticalPreset::Balanced => PresetParams {
                ma_window: 3,
                trend_window: 6,
                weight_stable: 0.7,
                weight_trend: 0.3,
                damping: 0.9,
            },
            StatisticalPreset::Aggressive => PresetParams {
                ma_window: 2,
                trend_window: 3,
                weight_stable: 0.5,
                weight_trend: 0.5,
                damping: 0.95,
            },
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            StatisticalPreset::Conservative => "conservative",
            StatisticalPreset::Balanced => "balanced",
            StatisticalPreset::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for StatisticalPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatisticalPreset {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(StatisticalPreset::Conservative),
            "balanced" => Ok(StatisticalPreset::Balanced),
            "aggressive" => Ok(StatisticalPreset::Aggressive),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown statistical preset '{other}'"
            ))),
        }
    }
}

/// Moving-average + damped linear trend forecaster.
#[derive(Debug, Clone)]
pub struct StatisticalForecast {
    preset: StatisticalPreset,
    params: PresetParams,
    name: String,
}

impl StatisticalForecast {
    /// Create a forecaster for the given preset.
    pub fn new(preset: StatisticalPreset) -> Self {
        Self {
            preset,
            params: preset.params(),
            name: format!("Statistical({preset})"),
        }
    }

    pub fn conservative() -> Self {
        Self::new(StatisticalPreset::Conservative)
    }

    pub fn balanced() -> Self {
        Self::new(StatisticalPreset::Balanced)
    }

    pub fn aggressive() -> Self {
        Self::new(StatisticalPreset::Aggressive)
    }

    /// Get the preset.
    pub fn preset(&self) -> StatisticalPreset {
        self.preset
    }

    /// Get the preset parameters.
    pub fn params(&self) -> PresetParams {
        self.params
    }

    /// Raw (unclamped, unrounded) projections.
    fn project(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        let n = history.len();
        let p = self.params;
        let ma_window = p.ma_window.clamp(1, n);
        let trend_window = p.trend_window.clamp(1, n);

        let base = mean(&history[n - ma_window..]);
        let slope = trend_slope(&history[n - trend_window..]);

        (0..horizon)
            .map(|i| {
                let trend_part = slope * (i + 1) as f64 * p.damping.powi(i as i32);
                p.weight_stable * base + p.weight_trend * (base + trend_part)
            })
            .collect()
    }
}

impl Default for StatisticalForecast {
    fn default() -> Self {
        Self::balanced()
    }
}

impl ForecastStrategy for StatisticalForecast {
    fn forecast(&self, history: &[f64], horizon: usize, precision: u32) -> Result<Forecast> {
        check_horizon(horizon)?;
        if let Some(zero) = self.handle_insufficient_data(history, horizon, precision) {
            return Ok(zero);
        }
        let raw = self.project(history, horizon);
        Ok(rounding::finalized_forecast(&raw, precision, &self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
