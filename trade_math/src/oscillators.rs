//! Oscillator indicator implementations
//!
//! Contains implementations of:
//! - Relative Strength Index (RSI), Wilder smoothing
//! - Moving Average Convergence Divergence (MACD)

use crate::moving_averages::ExponentialMovingAverage;
use crate::{MathError, Result};

/// RSI reported when the look-back window holds neither gains nor losses
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index (RSI) implementation
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    changes_seen: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            changes_seen: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: None,
            avg_loss: None,
        })
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) {
        if let Some(prev_price) = self.previous_price {
            let change = price - prev_price;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            match (self.avg_gain, self.avg_loss) {
                (Some(avg_gain), Some(avg_loss)) => {
                    // new_avg = (prev_avg * (period - 1) + current_value) / period
                    let n = self.period as f64;
                    self.avg_gain = Some((avg_gain * (n - 1.0) + gain) / n);
                    self.avg_loss = Some((avg_loss * (n - 1.0) + loss) / n);
                }
                _ => {
                    self.gain_sum += gain;
                    self.loss_sum += loss;
                    self.changes_seen += 1;

                    // Seed with the simple average of the first `period` changes
                    if self.changes_seen == self.period {
                        self.avg_gain = Some(self.gain_sum / self.period as f64);
                        self.avg_loss = Some(self.loss_sum / self.period as f64);
                    }
                }
            }
        }

        self.previous_price = Some(price);
    }

    /// Get the current RSI value (0-100)
    ///
    /// A window without losses reports 100; a window without any movement
    /// reports [`NEUTRAL_RSI`].
    pub fn value(&self) -> Result<f64> {
        match (self.avg_gain, self.avg_loss) {
            (Some(avg_gain), Some(avg_loss)) => {
                if avg_loss <= 0.0 {
                    if avg_gain <= 0.0 {
                        return Ok(NEUTRAL_RSI);
                    }
                    return Ok(100.0);
                }

                let rs = avg_gain / avg_loss;
                Ok((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
            }
            _ => Err(MathError::InsufficientData(format!(
                "Not enough data for RSI calculation. Need {} values, have {}.",
                self.period + 1,
                self.changes_seen + usize::from(self.previous_price.is_some())
            ))),
        }
    }
}

/// Moving Average Convergence Divergence (MACD) implementation
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: ExponentialMovingAverage,
    slow_ema: ExponentialMovingAverage,
    signal_ema: ExponentialMovingAverage,
}

impl Macd {
    /// Create a new MACD with the specified parameters
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self> {
        if fast_period == 0 || fast_period >= slow_period {
            return Err(MathError::InvalidInput(
                "Fast period must be non-zero and smaller than slow period".to_string(),
            ));
        }

        if signal_period == 0 {
            return Err(MathError::InvalidInput(
                "Signal period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            fast_ema: ExponentialMovingAverage::new(fast_period)?,
            slow_ema: ExponentialMovingAverage::new(slow_period)?,
            signal_ema: ExponentialMovingAverage::new(signal_period)?,
        })
    }

    /// Update the MACD with a new price value
    pub fn update(&mut self, price: f64) {
        self.fast_ema.update(price);
        self.slow_ema.update(price);

        // The signal line only sees MACD values once both EMAs are warm
        if let Ok(macd_value) = self.macd_value() {
            self.signal_ema.update(macd_value);
        }
    }

    /// Get the current MACD line value (fast EMA - slow EMA)
    pub fn macd_value(&self) -> Result<f64> {
        match (self.fast_ema.value(), self.slow_ema.value()) {
            (Ok(fast), Ok(slow)) => Ok(fast - slow),
            _ => Err(MathError::InsufficientData(
                "Not enough data to calculate MACD line".to_string(),
            )),
        }
    }

    /// Get the current signal line value (EMA of MACD)
    pub fn signal_value(&self) -> Result<f64> {
        self.signal_ema.value().map_err(|_| {
            MathError::InsufficientData("Not enough data to calculate signal line".to_string())
        })
    }

    /// Get the current histogram value (MACD line - signal line)
    pub fn histogram(&self) -> Result<f64> {
        Ok(self.macd_value()? - self.signal_value()?)
    }
}
