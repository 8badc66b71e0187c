//! Human-readable views over fitted claims coefficients.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coefficients::ModelCoefficients;
use crate::core::round_to;
use crate::correlation::CorrelationAnalysis;

/// One forecasted period of claim sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClaimPrediction {
    /// 1-based position within the supplied future reclamations.
    pub period_index: usize,
    /// Expected claim sum, never negative.
    pub predicted_sum: f64,
    /// Lower confidence bound, never negative.
    pub confidence_lower: f64,
    /// Upper confidence bound.
    pub confidence_upper: f64,
    /// Reclamation count the prediction was derived from.
    pub base_reclamations: f64,
    /// Continuous expectation of the number of claims, one decimal.
    pub expected_claims_count: f64,
}

/// Qualitative band for a regression's R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Excellent,
    Good,
    Satisfactory,
    Weak,
    Unexplained,
}

impl FitQuality {
    pub fn from_r_squared(r_squared: f64) -> Self {
        match r_squared {
            r if r >= 0.9 => Self::Excellent,
            r if r >= 0.7 => Self::Good,
            r if r >= 0.5 => Self::Satisfactory,
            r if r >= 0.3 => Self::Weak,
            _ => Self::Unexplained,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Satisfactory => "satisfactory",
            Self::Weak => "weak",
            Self::Unexplained => "does not explain the variation",
        }
    }
}

impl fmt::Display for FitQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Rounded projection of [`ModelCoefficients`] for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSummary {
    pub lag_months: usize,
    pub correlation: f64,
    pub conversion_rate: f64,
    pub conversion_rate_percent: f64,
    pub conversion_std: f64,
    pub avg_claim_amount: f64,
    pub avg_claim_std: f64,
    pub regression_slope: f64,
    pub regression_intercept: f64,
    pub r_squared: f64,
    pub residual_std: f64,
    /// Fitted relation, e.g. `claim_sum = 2.0000 × reclamations + 0.00`.
    pub formula: String,
}

impl From<&ModelCoefficients> for CoefficientSummary {
    fn from(c: &ModelCoefficients) -> Self {
        let sign = if c.regression_intercept < 0.0 { '-' } else { '+' };
        Self {
            lag_months: c.lag_months,
            correlation: round_to(c.correlation, 3),
            conversion_rate: round_to(c.conversion_rate, 3),
            conversion_rate_percent: round_to(c.conversion_rate * 100.0, 1),
            conversion_std: round_to(c.conversion_std, 3),
            avg_claim_amount: round_to(c.avg_claim_amount, 2),
            avg_claim_std: round_to(c.avg_claim_std, 2),
            regression_slope: round_to(c.regression_slope, 4),
            regression_intercept: round_to(c.regression_intercept, 2),
            r_squared: round_to(c.r_squared, 3),
            residual_std: round_to(c.residual_std, 2),
            formula: format!(
                "claim_sum = {:.4} × reclamations {sign} {:.2}",
                c.regression_slope,
                c.regression_intercept.abs()
            ),
        }
    }
}

/// Everything known about a fitted claims model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub coefficients: CoefficientSummary,
    pub fit_quality: FitQuality,
    /// Reclamations against claim sums over the configured lag range.
    pub correlation: CorrelationAnalysis,
    /// Number of months in the shortest input series.
    pub history_months: usize,
    pub confidence_level: f64,
    pub z_score: f64,
}

/// Critical value for the supported confidence levels; 1.96 otherwise.
pub fn z_score(confidence_level: f64) -> f64 {
    if (confidence_level - 0.99).abs() < 1e-9 {
        2.576
    } else {
        1.96
    }
}
