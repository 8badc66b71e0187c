//! Error types for the claims-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during forecasting operations.
///
/// Most variants never reach the caller of a strategy's `forecast()`: they are
/// produced by internal fitting routines and converted into the documented
/// fallback forecast. Only programmer errors (a zero horizon, an inverted lag
/// range, an invalid configuration) are returned from the public entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Every value of the input is exactly zero.
    #[error("all values are zero")]
    AllZero,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// An optional numerical backend is not wired in.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}
