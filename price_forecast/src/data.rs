//! Price and value series containers
//!
//! [`PriceSeries`] holds daily OHLCV bars as delivered by a market-data
//! provider. [`TimeSeries`] is the (date, value) container every derived
//! series uses: smoothed closes, scaled closes, forecasts and indicators.
//! Gaps between dates are allowed and never filled.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One daily OHLCV observation
///
/// Open, high, low and volume are optional because some providers only
/// deliver closes. Accessors substitute the close for missing prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// Create a close-only bar
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// Create a full OHLC bar
    pub fn with_ohlc(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume: None,
        }
    }

    /// Attach a traded volume
    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn open(&self) -> f64 {
        self.open.unwrap_or(self.close)
    }

    pub fn high(&self) -> f64 {
        self.high.unwrap_or(self.close)
    }

    pub fn low(&self) -> f64 {
        self.low.unwrap_or(self.close)
    }

    /// (open, high, low, close) with missing prices replaced by the close
    pub fn ohlc(&self) -> (f64, f64, f64, f64) {
        (self.open(), self.high(), self.low(), self.close)
    }

    fn validate(&self) -> Result<()> {
        let prices = [Some(self.close), self.open, self.high, self.low];
        if prices
            .iter()
            .flatten()
            .any(|price| !price.is_finite() || *price < 0.0)
        {
            return Err(ForecastError::InvalidSeries(format!(
                "bar {} has a negative or non-finite price",
                self.date
            )));
        }
        Ok(())
    }
}

/// Latest close and its change against the previous close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub close: f64,
    pub change: f64,
}

/// Ordered daily bars with unique, strictly increasing dates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date
    ///
    /// Duplicate dates and negative or non-finite prices are rejected.
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self> {
        bars.sort_by_key(|bar| bar.date);

        for bar in &bars {
            bar.validate()?;
        }
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ForecastError::InvalidSeries(format!(
                "duplicate timestamp {}",
                pair[0].date
            )));
        }

        Ok(Self { bars })
    }

    /// Build from bars already validated and in strictly increasing date order
    pub(crate) fn from_sorted(bars: Vec<PriceBar>) -> Self {
        debug_assert!(bars.windows(2).all(|pair| pair[0].date < pair[1].date));
        Self { bars }
    }

    /// An empty series, the degenerate answer of a provider with no history
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a close-only series from parallel date and close vectors
    pub fn from_closes(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "{} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }
        Self::new(
            dates
                .into_iter()
                .zip(closes)
                .map(|(date, close)| PriceBar::new(date, close))
                .collect(),
        )
    }

    /// Parse a provider CSV export (`Date,Open,High,Low,Close,Volume`)
    ///
    /// Only `Date` and `Close` are required; rows without a close are
    /// skipped. Column names are matched case-insensitively for the common
    /// spellings.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut bars = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row?;
            let Some(close) = row.close else {
                continue;
            };
            bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close,
                volume: row.volume.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u64),
            });
        }

        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_bar(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last_bar(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Close prices as a dated value series
    pub fn close_series(&self) -> TimeSeries {
        TimeSeries::from_parts(self.dates(), self.closes())
    }

    /// The last `n` bars (all of them when `n` exceeds the length)
    pub fn tail(&self, n: usize) -> Self {
        let start = self.bars.len().saturating_sub(n);
        Self::from_sorted(self.bars[start..].to_vec())
    }

    /// Bars dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Self {
        let first = self.bars.partition_point(|bar| bar.date < start);
        Self::from_sorted(self.bars[first..].to_vec())
    }

    /// Bars dated within `start..=end`
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let first = self.bars.partition_point(|bar| bar.date < start);
        let last = self.bars.partition_point(|bar| bar.date <= end).max(first);
        Self::from_sorted(self.bars[first..last].to_vec())
    }

    /// Latest close and its change against the previous bar
    ///
    /// With a single bar the change is zero.
    pub fn daily_change(&self) -> Option<DailyChange> {
        let latest = self.bars.last()?;
        let previous = self
            .bars
            .len()
            .checked_sub(2)
            .map(|i| self.bars[i].close)
            .unwrap_or(latest.close);
        Some(DailyChange {
            date: latest.date,
            close: latest.close,
            change: latest.close - previous,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date", alias = "DATE", alias = "Datetime")]
    date: NaiveDate,
    #[serde(rename = "Open", alias = "open", default)]
    open: Option<f64>,
    #[serde(rename = "High", alias = "high", default)]
    high: Option<f64>,
    #[serde(rename = "Low", alias = "low", default)]
    low: Option<f64>,
    #[serde(rename = "Close", alias = "close", default)]
    close: Option<f64>,
    #[serde(rename = "Volume", alias = "volume", default)]
    volume: Option<f64>,
}

/// Dated values with strictly increasing dates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, validating lengths and date ordering
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ForecastError::InvalidSeries(format!(
                "dates not strictly increasing at {}",
                pair[1]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Build from parts already known to be aligned and ordered
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        Self { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.last()?, *self.values.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Apply `f` to every value, keeping the dates
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            dates: self.dates.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Split into the first `at` points and the rest
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let at = at.min(self.len());
        (
            Self::from_parts(self.dates[..at].to_vec(), self.values[..at].to_vec()),
            Self::from_parts(self.dates[at..].to_vec(), self.values[at..].to_vec()),
        )
    }

    /// Points dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Self {
        let first = self.dates.partition_point(|date| *date < start);
        self.split_at(first).1
    }

    /// Points dated within `start..=end`
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let first = self.dates.partition_point(|date| *date < start);
        let last = self.dates.partition_point(|date| *date <= end).max(first);
        Self::from_parts(
            self.dates[first..last].to_vec(),
            self.values[first..last].to_vec(),
        )
    }

    /// Append `other`, which must start after this series ends
    pub fn concat(&self, other: &TimeSeries) -> Result<Self> {
        let mut dates = self.dates.clone();
        dates.extend_from_slice(&other.dates);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Self::new(dates, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_series_is_sorted_on_construction() {
        let series = PriceSeries::new(vec![
            PriceBar::new(day(5), 11.0),
            PriceBar::new(day(4), 10.0),
        ])
        .unwrap();
        assert_eq!(series.dates(), vec![day(4), day(5)]);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let result = PriceSeries::new(vec![PriceBar::new(day(4), 1.0), PriceBar::new(day(4), 2.0)]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn test_missing_ohlc_substitutes_close() {
        let bar = PriceBar::new(day(4), 12.5);
        assert_eq!(bar.ohlc(), (12.5, 12.5, 12.5, 12.5));
    }

    #[test]
    fn test_time_series_since_and_split() {
        let series = TimeSeries::new(vec![day(1), day(4), day(6)], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.since(day(2)).values(), &[2.0, 3.0]);
        let (head, tail) = series.split_at(1);
        assert_eq!(head.values(), &[1.0]);
        assert_eq!(tail.dates(), &[day(4), day(6)]);
    }
}
