//! Error types for the price_forecast crate
//!
//! These errors are raised by internal stages. The public operations of the
//! engine translate each of them into a documented fallback (flat forecast,
//! unavailable score, pass-through scaling, default window) so callers never
//! see them at the boundary unless they call a stage directly.

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Series too short for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The forecasting model could not be fitted with the requested order
    #[error("Model failed to converge: {0}")]
    Convergence(String),

    /// Missing or malformed scaling parameters
    #[error("Scaling error: {0}")]
    Scaling(String),

    /// Unrecognized look-back window token
    #[error("Invalid period token: {0:?}")]
    InvalidPeriodToken(String),

    /// Structurally invalid price series (duplicate or unordered timestamps)
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Error from the numerical kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while decoding provider CSV exports
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error while decoding JSON configuration or metadata
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
