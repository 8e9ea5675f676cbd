//! # Trade Math
//!
//! Numerical kernels behind the price forecasting engine: streaming moving
//! averages and oscillators, plus the least squares solver used by the
//! stationarity test and the autoregressive estimator.
//!
//! Everything here works on plain `f64` sequences and knows nothing about
//! calendars; date alignment lives in `price_forecast`.

use thiserror::Error;

pub mod moving_averages;
pub mod oscillators;
pub mod regression;

pub use moving_averages::{ExponentialMovingAverage, SimpleMovingAverage};
pub use oscillators::{Macd, RelativeStrengthIndex};
pub use regression::{ols, OlsFit};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
