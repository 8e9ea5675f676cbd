//! # Price Forecast
//!
//! Time series preprocessing and short-horizon forecasting for daily
//! equity prices.
//!
//! ## Features
//!
//! - Daily OHLCV series with optional columns (`data`)
//! - Calendar look-back windows: 5D, 1M, 6M, YTD, 1Y, 5Y, MAX (`period`)
//! - Rolling-mean smoothing (`smoothing`)
//! - Differencing order selection by augmented Dickey-Fuller (`stationarity`)
//! - Reversible min-max scaling (`scaling`)
//! - ARIMA fitting, hold-out backtesting and business-day forecasts
//!   (`models`, `metrics`)
//! - RSI, MACD, SMA and EMA aligned to the price dates (`indicators`)
//! - A pipeline that never fails, only degrades (`pipeline`)
//!
//! Nothing here performs network or disk I/O. Fetching prices, caching
//! fetches (see [`cache::Memoizer`]) and rendering belong to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use price_forecast::{ForecastPipeline, PipelineConfig, PriceSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
//! let dates: Vec<NaiveDate> = (0..200).map(|i| start + Duration::days(i)).collect();
//! let closes: Vec<f64> = (0..200).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect();
//! let series = PriceSeries::from_closes(dates, closes).unwrap();
//!
//! let output = ForecastPipeline::new(PipelineConfig::default()).run(&series);
//! assert_eq!(output.forecast.horizons(), 30);
//! println!("backtest RMSE: {}", output.backtest);
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod period;
pub mod pipeline;
pub mod profile;
pub mod scaling;
pub mod smoothing;
pub mod stationarity;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{IndicatorConfig, IndicatorKind, PipelineConfig};
pub use crate::data::{PriceBar, PriceSeries, TimeSeries};
pub use crate::error::ForecastError;
pub use crate::indicators::{IndicatorEngine, IndicatorSeries, IndicatorSet};
pub use crate::metrics::BacktestScore;
pub use crate::models::{ForecastModel, ForecastResult, ForecastStatus, TrainedForecastModel};
pub use crate::period::Period;
pub use crate::pipeline::{ForecastPipeline, PipelineOutput};
pub use crate::scaling::ScalingParameters;
pub use crate::stationarity::StationarityAnalyzer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
