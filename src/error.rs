//! Error types for the detection engine
//!
//! Every variant is absorbed at the `detect_anomalies` boundary; callers
//! of the public engine API never see these.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors raised by the internal pipeline stages
#[derive(Debug, Error)]
pub enum DetectError {
    /// Malformed or inconsistent input data
    #[error("Data error: {0}")]
    DataError(String),

    /// Matrix dimensions do not match what a stage expects
    #[error("Shape error: {0}")]
    ShapeError(String),

    /// Numeric computation failed
    #[error("Computation error: {0}")]
    ComputationError(String),

    /// A transform was used before fitting
    #[error("Model not fitted")]
    ModelNotFitted,
}
