//! Claims prediction from reclamation history.

mod analysis;
mod coefficients;
mod predictor;

pub use analysis::{z_score, ClaimPrediction, CoefficientSummary, FitQuality, FullAnalysis};
pub use coefficients::{ModelCoefficients, OUTLIER_SIGMAS};
pub use predictor::{ClaimsPredictor, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_MAX_LAG};
