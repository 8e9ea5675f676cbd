//! Serializable configuration for the pipeline and the indicator engine
//!
//! Every struct has a `Default` matching the engine's fixed constants, so a
//! JSON document only needs to name the fields it overrides.

use crate::error::Result;
use crate::indicators::{DEFAULT_MACD, DEFAULT_RSI_WINDOW};
use crate::metrics::BacktestConfig;
use crate::models::{ModelConfig, DEFAULT_HORIZON};
use crate::period::Period;
use crate::smoothing::DEFAULT_WINDOW;
use crate::stationarity::StationarityConfig;
use serde::{Deserialize, Serialize};

/// Which indicator family an [`IndicatorConfig`] requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorKind {
    /// RSI over `IndicatorConfig::window`
    Rsi,
    /// MACD line, signal line and histogram
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// `SMA_<window>` plus `EMA_<ema_span>` overlays
    MovingAverage { ema_span: usize },
}

/// One request to the indicator engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub period: Period,
    pub window: usize,
    pub indicator: IndicatorKind,
}

impl IndicatorConfig {
    pub fn rsi(period: Period, window: usize) -> Self {
        Self {
            period,
            window,
            indicator: IndicatorKind::Rsi,
        }
    }

    /// MACD with the conventional 12/26/9 spans
    pub fn macd(period: Period) -> Self {
        let (fast, slow, signal) = DEFAULT_MACD;
        Self {
            period,
            window: slow,
            indicator: IndicatorKind::Macd { fast, slow, signal },
        }
    }

    pub fn moving_average(period: Period, sma_window: usize, ema_span: usize) -> Self {
        Self {
            period,
            window: sma_window,
            indicator: IndicatorKind::MovingAverage { ema_span },
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self::rsi(Period::default(), DEFAULT_RSI_WINDOW)
    }
}

/// Settings for a full forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rolling-mean window applied to the closes
    pub smoothing_window: usize,
    /// Business days forecast
    pub horizon: usize,
    pub stationarity: StationarityConfig,
    pub model: ModelConfig,
    pub backtest: BacktestConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
            stationarity: StationarityConfig::default(),
            model: ModelConfig::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
