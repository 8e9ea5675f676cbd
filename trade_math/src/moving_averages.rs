//! Moving average calculation implementations
//!
//! Contains streaming implementations of:
//! - Simple Moving Average (SMA)
//! - Exponential Moving Average (EMA)
//!
//! Both are fed one value at a time and report `InsufficientData` until
//! their window is warm, so batch callers can drop leading undefined points.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
    }

    /// Whether a full window has been observed
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.values.iter().sum::<f64>() / self.period as f64)
    }
}

/// Exponential Moving Average (EMA) implementation
///
/// Seeded with the first observation and updated recursively with
/// `alpha = 2 / (span + 1)`. The value is reported once `span` observations
/// have been seen.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    multiplier: f64,
    current_ema: Option<f64>,
    values_seen: usize,
}

impl ExponentialMovingAverage {
    /// Create a new Exponential Moving Average with the specified span
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        let multiplier = 2.0 / (period as f64 + 1.0);

        Ok(Self {
            period,
            multiplier,
            current_ema: None,
            values_seen: 0,
        })
    }

    /// Update the EMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values_seen += 1;

        self.current_ema = Some(match self.current_ema {
            None => value,
            // EMA = (value - EMA(previous)) * multiplier + EMA(previous)
            Some(current) => (value - current) * self.multiplier + current,
        });
    }

    /// Whether `period` values have been observed
    pub fn is_ready(&self) -> bool {
        self.values_seen >= self.period
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        match self.current_ema {
            Some(ema) if self.is_ready() => Ok(ema),
            _ => Err(MathError::InsufficientData(format!(
                "Not enough data for EMA calculation. Need at least {} values, have {}.",
                self.period, self.values_seen
            ))),
        }
    }

    /// Reset the EMA, clearing all values
    pub fn reset(&mut self) {
        self.current_ema = None;
        self.values_seen = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0);
        sma.update(4.0);

        // Still not enough data
        assert!(sma.value().is_err());

        sma.update(6.0);
        assert_eq!(sma.value().unwrap(), 4.0); // (2 + 4 + 6) / 3

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value().unwrap(), 6.0); // (4 + 6 + 8) / 3
    }

    #[test]
    fn test_sma_rejects_zero_period() {
        assert!(SimpleMovingAverage::new(0).is_err());
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let mut ema = ExponentialMovingAverage::new(3).unwrap();

        ema.update(2.0);
        ema.update(4.0);
        assert!(ema.value().is_err());

        ema.update(6.0);
        // alpha = 0.5: 2 -> 3 -> 4.5
        assert!((ema.value().unwrap() - 4.5).abs() < 1e-12);

        ema.update(8.0);
        assert!((ema.value().unwrap() - 6.25).abs() < 1e-12);
    }

    #[test]
    fn test_ema_of_constant_is_constant() {
        let mut ema = ExponentialMovingAverage::new(12).unwrap();
        for _ in 0..40 {
            ema.update(42.0);
        }
        assert_eq!(ema.value().unwrap(), 42.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ema = ExponentialMovingAverage::new(2).unwrap();
        ema.update(1.0);
        ema.update(2.0);
        assert!(ema.value().is_ok());
        ema.reset();
        assert!(ema.value().is_err());
    }
}
