//! # Stock Insight
//!
//! Facade over the workspace crates.
//!
//! - [`trade_math`]: streaming indicator kernels and least squares
//! - [`price_forecast`]: period windows, smoothing, stationarity, scaling,
//!   ARIMA forecasting, indicators and the forecast pipeline
//!
//! ```
//! use stock_insight::price_forecast::{Period, PriceSeries};
//! use chrono::NaiveDate;
//!
//! let reference = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
//! let window = Period::parse_or_default("ytd").resolve(&PriceSeries::empty(), reference);
//! assert!(window.is_empty());
//! ```

pub use price_forecast;
pub use trade_math;
