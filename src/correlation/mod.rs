//! Lag-correlation analysis between two monthly series.
//!
//! Used to find how many months reclamations lead claims, and how strongly
//! the two move together.

mod lag;
pub mod significance;

pub use lag::{
    CorrelationAnalysis, CorrelationStrength, LagCorrelationResult, OptimalLagResult,
    TimeSeriesCorrelation, DEFAULT_SIGNIFICANCE_LEVEL, MIN_OVERLAP,
};
pub use significance::{NormalApproximation, SharedSignificanceTest, SignificanceTest, StudentT};
