//! Claims predictor linking reclamation counts to future claim sums.

use std::sync::Arc;

use super::analysis::{z_score, ClaimPrediction, CoefficientSummary, FitQuality, FullAnalysis};
use super::coefficients::{derive, FitInputs, ModelCoefficients};
use crate::core::{rounding, round_to, Forecast};
use crate::correlation::{SharedSignificanceTest, StudentT, TimeSeriesCorrelation};
use crate::error::Result;
use crate::models::seasonal::{SeasonalForecast, SharedSeasonalBackend};
use crate::models::traits::{check_horizon, ForecastStrategy};

/// Largest lag searched when none is fixed.
pub const DEFAULT_MAX_LAG: u32 = 6;

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FitState {
    Unfitted,
    Fitted(ModelCoefficients),
}

/// Predicts claim sums from reclamation counts.
///
/// Reclamations tend to turn into claims a few months later. Fitting finds
/// that lag, the share of reclamations that become claims, the typical claim
/// amount and a linear relation between reclamations and claim sums.
///
/// `fit` and `predict` take `&mut self`; sharing one predictor between threads
/// needs a `Mutex` or similar around it. The read-only views derive
/// coefficients on the fly when the model has not been fitted yet.
///
/// # Example
///
/// ```
/// use claims_forecast::models::ClaimsPredictor;
///
/// let rec = vec![10.0, 14.0, 9.0, 20.0, 17.0, 25.0, 12.0, 30.0];
/// let counts: Vec<f64> = rec.iter().map(|r| r * 0.5).collect();
/// let sums: Vec<f64> = counts.iter().map(|c| c * 200.0).collect();
///
/// let mut predictor = ClaimsPredictor::new(rec, counts, sums);
/// let predictions = predictor.predict(&[12.0, 18.0]);
/// assert_eq!(predictions.len(), 2);
/// assert!(predictions[0].confidence_lower <= predictions[0].predicted_sum);
/// ```
#[derive(Debug, Clone)]
pub struct ClaimsPredictor {
    reclamations: Vec<f64>,
    claim_counts: Vec<f64>,
    claim_sums: Vec<f64>,
    fixed_lag: Option<usize>,
    max_lag: u32,
    confidence_level: f64,
    significance: SharedSignificanceTest,
    seasonal: SeasonalForecast,
    state: FitState,
}

impl ClaimsPredictor {
    /// Create an unfitted predictor over monthly history.
    ///
    /// Series of different length are truncated to their overlap wherever
    /// they are compared.
    pub fn new(
        reclamations: impl Into<Vec<f64>>,
        claim_counts: impl Into<Vec<f64>>,
        claim_sums: impl Into<Vec<f64>>,
    ) -> Self {
        Self {
            reclamations: reclamations.into(),
            claim_counts: claim_counts.into(),
            claim_sums: claim_sums.into(),
            fixed_lag: None,
            max_lag: DEFAULT_MAX_LAG,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            significance: Arc::new(StudentT),
            seasonal: SeasonalForecast::auto(),
            state: FitState::Unfitted,
        }
    }

    /// Use `lag` months instead of searching for the best lag.
    pub fn with_fixed_lag(mut self, lag: usize) -> Self {
        self.fixed_lag = Some(lag);
        self.state = FitState::Unfitted;
        self
    }

    /// Set the largest lag considered by the search.
    pub fn with_max_lag(mut self, max_lag: u32) -> Self {
        self.max_lag = max_lag;
        self.state = FitState::Unfitted;
        self
    }

    /// Set the confidence level of the prediction bounds (0.95 or 0.99).
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Wire in a different significance test for the lag analysis.
    pub fn with_significance_test(mut self, test: SharedSignificanceTest) -> Self {
        self.significance = test;
        self.state = FitState::Unfitted;
        self
    }

    /// Wire in a different backend for the reclamation forecast.
    pub fn with_seasonal_backend(mut self, backend: SharedSeasonalBackend) -> Self {
        self.seasonal = self.seasonal.with_backend(backend);
        self
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, FitState::Fitted(_))
    }

    /// Fitted coefficients, if `fit` has run.
    pub fn coefficients(&self) -> Option<&ModelCoefficients> {
        match &self.state {
            FitState::Fitted(c) => Some(c),
            FitState::Unfitted => None,
        }
    }

    /// Derive the model coefficients from the stored history.
    ///
    /// Refitting unchanged history yields identical coefficients.
    pub fn fit(&mut self) -> &mut Self {
        self.state = FitState::Fitted(self.derive_coefficients());
        self
    }

    /// Predict claim sums for each future reclamation count, fitting first
    /// when needed.
    pub fn predict(&mut self, future_reclamations: &[f64]) -> Vec<ClaimPrediction> {
        let coefficients = match self.state {
            FitState::Fitted(c) => c,
            FitState::Unfitted => {
                self.fit();
                self.current_coefficients()
            }
        };
        self.predict_with(&coefficients, future_reclamations)
    }

    /// Forecast reclamations `horizon` months ahead and predict the claims
    /// they lead to.
    pub fn forecast_claims(&self, horizon: usize) -> Result<Vec<ClaimPrediction>> {
        check_horizon(horizon)?;
        let future = self.seasonal.forecast(&self.reclamations, horizon, 0)?;
        Ok(self.predict_with(&self.current_coefficients(), future.values()))
    }

    /// Rounded coefficients for reporting.
    pub fn get_coefficients(&self) -> CoefficientSummary {
        CoefficientSummary::from(&self.current_coefficients())
    }

    /// Coefficients, fit quality and the lag analysis in one view.
    pub fn get_full_analysis(&self) -> FullAnalysis {
        let coefficients = self.current_coefficients();
        FullAnalysis {
            coefficients: CoefficientSummary::from(&coefficients),
            fit_quality: FitQuality::from_r_squared(coefficients.r_squared),
            correlation: self.correlation().analyze(self.max_lag),
            history_months: self.history_months(),
            confidence_level: self.confidence_level,
            z_score: z_score(self.confidence_level),
        }
    }

    fn history_months(&self) -> usize {
        self.reclamations
            .len()
            .min(self.claim_counts.len())
            .min(self.claim_sums.len())
    }

    fn correlation(&self) -> TimeSeriesCorrelation {
        TimeSeriesCorrelation::new(self.reclamations.clone(), self.claim_sums.clone())
            .with_test(Arc::clone(&self.significance))
    }

    fn derive_coefficients(&self) -> ModelCoefficients {
        let inputs = FitInputs {
            reclamations: &self.reclamations,
            claim_counts: &self.claim_counts,
            claim_sums: &self.claim_sums,
            fixed_lag: self.fixed_lag,
            max_lag: self.max_lag,
        };
        derive(inputs, &self.correlation())
    }

    fn current_coefficients(&self) -> ModelCoefficients {
        match self.state {
            FitState::Fitted(c) => c,
            FitState::Unfitted => self.derive_coefficients(),
        }
    }

    /// Unrounded claim sum for `x` reclamations, clamped at zero.
    fn claim_sum(c: &ModelCoefficients, x: f64) -> f64 {
        rounding::clamp_non_negative(c.regression_slope * x + c.regression_intercept)
    }

    fn predict_with(&self, c: &ModelCoefficients, future: &[f64]) -> Vec<ClaimPrediction> {
        let half_width = z_score(self.confidence_level) * c.residual_std;
        future
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let predicted = Self::claim_sum(c, x);
                ClaimPrediction {
                    period_index: i + 1,
                    predicted_sum: round_to(predicted, 2),
                    confidence_lower: round_to((predicted - half_width).max(0.0), 2),
                    confidence_upper: round_to(predicted + half_width, 2),
                    base_reclamations: x,
                    expected_claims_count: round_to(x * c.conversion_rate, 1),
                }
            })
            .collect()
    }
}

impl ForecastStrategy for ClaimsPredictor {
    /// Forecast claim sums from the stored reclamation history.
    ///
    /// `history` is ignored; the predictor always works from the series it
    /// was built with.
    fn forecast(&self, _history: &[f64], horizon: usize, precision: u32) -> Result<Forecast> {
        check_horizon(horizon)?;
        if let Some(zero) = self.handle_insufficient_data(&self.reclamations, horizon, precision) {
            return Ok(zero);
        }

        let future = self.seasonal.forecast(&self.reclamations, horizon, 0)?;
        let coefficients = self.current_coefficients();
        let sums: Vec<f64> = future
            .values()
            .iter()
            .map(|&x| Self::claim_sum(&coefficients, x))
            .collect();

        let forecast = rounding::finalized_forecast(&sums, precision, self.name());
        Ok(match future.fallback_reason() {
            Some(reason) => forecast.with_fallback_reason(reason),
            None => forecast,
        })
    }

    fn name(&self) -> &str {
        "ClaimsPredictor"
    }
}
