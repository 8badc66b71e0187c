//! Lagged cross-correlation between two monthly series.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::correlation::significance::{SharedSignificanceTest, StudentT};
use crate::error::{ForecastError, Result};
use crate::utils::pearson;

/// Default threshold below which a p-value counts as significant.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Minimum overlap for a correlation to be computed.
pub const MIN_OVERLAP: usize = 3;

/// Correlation of the two series at one lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelationResult {
    /// Offset applied: positive means the first series leads the second.
    pub lag: i32,
    /// Pearson coefficient in `[-1, 1]`.
    pub correlation: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub is_significant: bool,
    /// Number of aligned pairs.
    pub sample_size: usize,
}

impl LagCorrelationResult {
    fn neutral(lag: i32, sample_size: usize) -> Self {
        Self {
            lag,
            correlation: 0.0,
            p_value: 1.0,
            is_significant: false,
            sample_size,
        }
    }
}

/// Outcome of a lag search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalLagResult {
    /// Lag with the largest absolute correlation.
    pub optimal_lag: i32,
    /// Correlation at `optimal_lag`.
    pub correlation: f64,
    /// p-value at `optimal_lag`.
    pub p_value: f64,
    /// Every lag tested, in ascending lag order.
    pub all_results: Vec<LagCorrelationResult>,
}

impl OptimalLagResult {
    /// Result for the optimal lag.
    pub fn best(&self) -> Option<&LagCorrelationResult> {
        self.all_results.iter().find(|r| r.lag == self.optimal_lag)
    }
}

/// Qualitative strength of a correlation, banded on `|r|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    /// `|r| >= 0.7`
    Strong,
    /// `|r| >= 0.4`
    Moderate,
    /// `|r| >= 0.2`
    Weak,
    /// `|r| < 0.2`
    Negligible,
}

impl CorrelationStrength {
    /// Band a correlation coefficient.
    pub fn from_correlation(r: f64) -> Self {
        let a = r.abs();
        if a >= 0.7 {
            CorrelationStrength::Strong
        } else if a >= 0.4 {
            CorrelationStrength::Moderate
        } else if a >= 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::Negligible
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Negligible => "negligible",
        })
    }
}

/// Summary produced by [`TimeSeriesCorrelation::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    /// Lag search over `0..=max_lag`.
    pub optimal: OptimalLagResult,
    /// Unshifted correlation.
    pub correlation_at_zero: f64,
    /// Strength band of the optimal correlation.
    pub strength: CorrelationStrength,
    /// Whether the optimal correlation is significant.
    pub is_significant: bool,
    /// E.g. "strong positive relationship".
    pub interpretation: String,
    /// E.g. "first series leads the second by 2 months".
    pub lead_description: String,
}

/// Cross-correlation engine for two index-aligned series.
///
/// The series may differ in length; every comparison is truncated to the
/// overlap.
#[derive(Debug, Clone)]
pub struct TimeSeriesCorrelation {
    first: Vec<f64>,
    second: Vec<f64>,
    significance_level: f64,
    test: SharedSignificanceTest,
}

impl TimeSeriesCorrelation {
    /// Create an engine with the default significance level and exact t test.
    pub fn new(first: impl Into<Vec<f64>>, second: impl Into<Vec<f64>>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            test: Arc::new(StudentT),
        }
    }

    /// Set the significance level.
    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    /// Wire in a different significance test.
    pub fn with_test(mut self, test: SharedSignificanceTest) -> Self {
        self.test = test;
        self
    }

    /// Get the significance level.
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Align the series at `lag`, truncated to the common overlap.
    ///
    /// Returns `None` when the lag reaches past either series.
    fn align(&self, lag: i32) -> Option<(&[f64], &[f64])> {
        let shift = lag.unsigned_abs() as usize;
        let (lead, follow) = if lag >= 0 {
            (&self.first[..], &self.second[..])
        } else {
            (&self.second[..], &self.first[..])
        };
        if shift > 0 && (shift >= lead.len() || shift >= follow.len()) {
            return None;
        }
        let lead = &lead[..lead.len() - shift];
        let follow = &follow[shift..];
        let n = lead.len().min(follow.len());
        Some(if lag >= 0 {
            (&lead[..n], &follow[..n])
        } else {
            (&follow[..n], &lead[..n])
        })
    }

    /// Correlation with the first series shifted `lag` months ahead.
    ///
    /// For `lag > 0`, `first[t]` is paired with `second[t + lag]`; for
    /// `lag < 0` the roles are reversed.
    pub fn calculate_correlation_at_lag(&self, lag: i32) -> LagCorrelationResult {
        let Some((x, y)) = self.align(lag) else {
            return LagCorrelationResult::neutral(lag, 0);
        };
        let n = x.len();
        if n < MIN_OVERLAP {
            return LagCorrelationResult::neutral(lag, n);
        }
        let Some(r) = pearson(x, y) else {
            return LagCorrelationResult::neutral(lag, n);
        };

        let p_value = self.test.p_value(r, n).clamp(0.0, 1.0);
        tracing::trace!(lag, r, p_value, n, "lag correlation");
        LagCorrelationResult {
            lag,
            correlation: r,
            p_value,
            is_significant: p_value < self.significance_level,
            sample_size: n,
        }
    }

    /// Evaluate every lag in `min_lag..=max_lag` and pick the largest `|r|`.
    ///
    /// Ties keep the first lag encountered.
    pub fn find_optimal_lag(&self, max_lag: i32, min_lag: i32) -> Result<OptimalLagResult> {
        if min_lag > max_lag {
            return Err(ForecastError::InvalidParameter(format!(
                "min_lag {min_lag} exceeds max_lag {max_lag}"
            )));
        }
        Ok(self.scan(min_lag, max_lag))
    }

    /// Lag search over a non-empty range.
    fn scan(&self, min_lag: i32, max_lag: i32) -> OptimalLagResult {
        let all_results: Vec<LagCorrelationResult> = (min_lag..=max_lag)
            .map(|lag| self.calculate_correlation_at_lag(lag))
            .collect();

        let mut best = LagCorrelationResult::neutral(min_lag, 0);
        let mut seen = false;
        for r in &all_results {
            if !seen || r.correlation.abs() > best.correlation.abs() {
                best = *r;
                seen = true;
            }
        }
        tracing::debug!(
            optimal_lag = best.lag,
            correlation = best.correlation,
            tested = all_results.len(),
            "optimal lag found"
        );

        OptimalLagResult {
            optimal_lag: best.lag,
            correlation: best.correlation,
            p_value: best.p_value,
            all_results,
        }
    }

    /// Correlation at each lag `0..=max_lag`.
    pub fn get_correlation_matrix(&self, max_lag: u32) -> BTreeMap<i32, f64> {
        (0..=max_lag as i32)
            .map(|lag| (lag, self.calculate_correlation_at_lag(lag).correlation))
            .collect()
    }

    /// Lag search over `0..=max_lag` with a qualitative reading.
    pub fn analyze(&self, max_lag: u32) -> CorrelationAnalysis {
        let max_lag = max_lag as i32;
        let optimal = self.scan(0, max_lag);
        let correlation_at_zero = self.calculate_correlation_at_lag(0).correlation;
        let strength = CorrelationStrength::from_correlation(optimal.correlation);
        let is_significant = optimal.best().map(|b| b.is_significant).unwrap_or(false);

        let interpretation = match strength {
            CorrelationStrength::Negligible => "no meaningful relationship".to_string(),
            s => {
                let direction = if optimal.correlation >= 0.0 {
                    "positive"
                } else {
                    "negative"
                };
                format!("{s} {direction} relationship")
            }
        };
        let lead_description = match optimal.optimal_lag {
            0 => "series move together without delay".to_string(),
            1 => "first series leads the second by 1 month".to_string(),
            lag => format!("first series leads the second by {lag} months"),
        };

        CorrelationAnalysis {
            optimal,
            correlation_at_zero,
            strength,
            is_significant,
            interpretation,
            lead_description,
        }
    }
}
