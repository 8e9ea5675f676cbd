//! Rolling-mean smoothing of close prices

use crate::data::{PriceSeries, TimeSeries};
use tracing::debug;
use trade_math::SimpleMovingAverage;

/// Default smoothing window in bars
pub const DEFAULT_WINDOW: usize = 7;

/// Simple moving average over `window` consecutive points
///
/// The first `window - 1` points have no full window and are dropped, so
/// the output is `window - 1` points shorter than the input and keeps the
/// dates of the last point of each window. Returns an empty series when
/// the input is shorter than the window or the window is zero.
pub fn smooth(series: &TimeSeries, window: usize) -> TimeSeries {
    let Ok(mut sma) = SimpleMovingAverage::new(window) else {
        debug!("zero smoothing window");
        return TimeSeries::default();
    };
    if series.len() < window {
        debug!(len = series.len(), window, "series shorter than smoothing window");
        return TimeSeries::default();
    }

    let mut dates = Vec::with_capacity(series.len() + 1 - window);
    let mut values = Vec::with_capacity(series.len() + 1 - window);
    for (date, value) in series.iter() {
        sma.update(value);
        if let Ok(mean) = sma.value() {
            dates.push(date);
            values.push(mean);
        }
    }

    TimeSeries::from_parts(dates, values)
}

/// Smooth the close prices of a price series
pub fn smooth_closes(series: &PriceSeries, window: usize) -> TimeSeries {
    smooth(&series.close_series(), window)
}
