//! Technical indicators aligned to a price series' dates
//!
//! Each function drives one of the streaming kernels from `trade_math`
//! over the closes of a [`PriceSeries`] and keeps the dates of the points
//! where the indicator is defined; leading undefined points are dropped.
//! Inputs are only borrowed, never modified.

use crate::config::{IndicatorConfig, IndicatorKind};
use crate::data::{PriceSeries, TimeSeries};
use crate::error::Result;
use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trade_math::{ExponentialMovingAverage, Macd, RelativeStrengthIndex, SimpleMovingAverage};

/// Conventional RSI look-back
pub const DEFAULT_RSI_WINDOW: usize = 14;
/// Conventional MACD spans (fast, slow, signal)
pub const DEFAULT_MACD: (usize, usize, usize) = (12, 26, 9);

/// A named indicator line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: TimeSeries,
}

impl IndicatorSeries {
    pub fn values(&self) -> &[f64] {
        self.points.values()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.points.dates()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Drive a streaming indicator over the closes, keeping defined points
fn scan(series: &PriceSeries, mut step: impl FnMut(f64) -> Option<f64>) -> TimeSeries {
    let mut dates = Vec::new();
    let mut values = Vec::new();
    for bar in series.bars() {
        if let Some(value) = step(bar.close) {
            dates.push(bar.date);
            values.push(value);
        }
    }
    TimeSeries::from_parts(dates, values)
}

/// Relative Strength Index with Wilder smoothing
///
/// The first `window` points are undefined. Values are bounded to
/// `[0, 100]`: a window without losses reads 100 and a window without any
/// movement reads 50.
pub fn rsi(series: &PriceSeries, window: usize) -> Result<IndicatorSeries> {
    let mut indicator = RelativeStrengthIndex::new(window)?;
    let points = scan(series, |close| {
        indicator.update(close);
        indicator.value().ok()
    });
    Ok(IndicatorSeries {
        name: "RSI".to_string(),
        points,
    })
}

/// MACD line, its signal line and their difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// `EMA(fast) - EMA(slow)` and its `signal`-span EMA
pub fn macd(series: &PriceSeries, fast: usize, slow: usize, signal: usize) -> Result<MacdSeries> {
    let mut indicator = Macd::new(fast, slow, signal)?;

    let mut line = (Vec::new(), Vec::new());
    let mut signal_line = (Vec::new(), Vec::new());
    let mut histogram = (Vec::new(), Vec::new());
    for bar in series.bars() {
        indicator.update(bar.close);
        if let Ok(value) = indicator.macd_value() {
            line.0.push(bar.date);
            line.1.push(value);
        }
        if let Ok(value) = indicator.signal_value() {
            signal_line.0.push(bar.date);
            signal_line.1.push(value);
        }
        if let Ok(value) = indicator.histogram() {
            histogram.0.push(bar.date);
            histogram.1.push(value);
        }
    }

    let named = |name: &str, (dates, values): (Vec<NaiveDate>, Vec<f64>)| IndicatorSeries {
        name: name.to_string(),
        points: TimeSeries::from_parts(dates, values),
    };
    Ok(MacdSeries {
        macd: named("MACD", line),
        signal: named("Signal", signal_line),
        histogram: named("Histogram", histogram),
    })
}

/// Simple moving average of the closes, named `SMA_<window>`
pub fn sma(series: &PriceSeries, window: usize) -> Result<IndicatorSeries> {
    let mut average = SimpleMovingAverage::new(window)?;
    let points = scan(series, |close| {
        average.update(close);
        average.value().ok()
    });
    Ok(IndicatorSeries {
        name: format!("SMA_{}", window),
        points,
    })
}

/// Exponential moving average of the closes, named `EMA_<span>`
pub fn ema(series: &PriceSeries, span: usize) -> Result<IndicatorSeries> {
    let mut average = ExponentialMovingAverage::new(span)?;
    let points = scan(series, |close| {
        average.update(close);
        average.value().ok()
    });
    Ok(IndicatorSeries {
        name: format!("EMA_{}", span),
        points,
    })
}

/// Any number of SMA and EMA overlays at once
pub fn moving_averages(
    series: &PriceSeries,
    sma_windows: &[usize],
    ema_spans: &[usize],
) -> Result<Vec<IndicatorSeries>> {
    let smas = sma_windows.iter().map(|&window| sma(series, window));
    let emas = ema_spans.iter().map(|&span| ema(series, span));
    smas.chain(emas).collect()
}

/// Indicator lines restricted to a look-back window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub period: Period,
    /// Closes inside the window
    pub close: TimeSeries,
    pub lines: Vec<IndicatorSeries>,
}

impl IndicatorSet {
    /// Look up a line by name, e.g. `"RSI"` or `"SMA_20"`
    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.lines.iter().find(|line| line.name == name)
    }
}

/// Computes configured indicators over a calendar window
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute `config.indicator` over the full history, then keep the
    /// points inside `config.period` ending at `reference_date`
    pub fn compute(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
        reference_date: NaiveDate,
    ) -> Result<IndicatorSet> {
        let window = config.period.resolve(series, reference_date);

        let lines = match config.indicator {
            IndicatorKind::Rsi => vec![rsi(series, config.window)?],
            IndicatorKind::Macd { fast, slow, signal } => {
                let lines = macd(series, fast, slow, signal)?;
                vec![lines.macd, lines.signal, lines.histogram]
            }
            IndicatorKind::MovingAverage { ema_span } => {
                moving_averages(series, &[config.window], &[ema_span])?
            }
        };

        let (Some(first), Some(last)) = (window.first_bar(), window.last_bar()) else {
            debug!(period = %config.period, "no bars to chart");
            return Ok(IndicatorSet {
                period: config.period,
                close: TimeSeries::default(),
                lines: lines
                    .into_iter()
                    .map(|line| IndicatorSeries {
                        name: line.name,
                        points: TimeSeries::default(),
                    })
                    .collect(),
            });
        };

        Ok(IndicatorSet {
            period: config.period,
            close: window.close_series(),
            lines: lines
                .into_iter()
                .map(|line| IndicatorSeries {
                    points: line.points.within(first.date, last.date),
                    name: line.name,
                })
                .collect(),
        })
    }
}
