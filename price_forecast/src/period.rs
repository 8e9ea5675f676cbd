//! Calendar-aware look-back windows
//!
//! Maps dashboard period tokens (`5D`, `1M`, `6M`, `YTD`, `1Y`, `5Y`, `MAX`)
//! to a concrete sub-range of a price series.

use crate::data::PriceSeries;
use crate::error::ForecastError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Number of trailing bars returned when a window would otherwise be empty
pub const FALLBACK_BARS: usize = 252;

/// A symbolic look-back window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Period {
    FiveDays,
    OneMonth,
    SixMonths,
    YearToDate,
    #[default]
    OneYear,
    FiveYears,
    Max,
}

impl Period {
    /// Every supported token, in dashboard order
    pub const ALL: [Period; 7] = [
        Period::FiveDays,
        Period::OneMonth,
        Period::SixMonths,
        Period::YearToDate,
        Period::OneYear,
        Period::FiveYears,
        Period::Max,
    ];

    /// Parse a token, falling back to one year for anything unrecognized
    pub fn parse_or_default(token: &str) -> Self {
        token.parse().unwrap_or_else(|err: ForecastError| {
            warn!(%err, "falling back to 1Y window");
            Period::default()
        })
    }

    pub fn token(&self) -> &'static str {
        match self {
            Period::FiveDays => "5D",
            Period::OneMonth => "1M",
            Period::SixMonths => "6M",
            Period::YearToDate => "YTD",
            Period::OneYear => "1Y",
            Period::FiveYears => "5Y",
            Period::Max => "MAX",
        }
    }

    /// First date inside the window, or `None` for the full history
    pub fn start_date(&self, reference_date: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            Period::Max => return None,
            Period::YearToDate => {
                return NaiveDate::from_ymd_opt(reference_date.year(), 1, 1);
            }
            // 7 calendar days so a 5-session window survives a weekend
            Period::FiveDays => 7,
            Period::OneMonth => 30,
            Period::SixMonths => 182,
            Period::OneYear => 365,
            Period::FiveYears => 365 * 5,
        };
        Some(reference_date - Duration::days(days))
    }

    /// Restrict `series` to this window ending at `reference_date`
    ///
    /// `MAX` returns the series unchanged. A window that contains no bars
    /// falls back to the last [`FALLBACK_BARS`] bars; the result is only
    /// empty when the input is.
    pub fn resolve(&self, series: &PriceSeries, reference_date: NaiveDate) -> PriceSeries {
        let Some(start) = self.start_date(reference_date) else {
            return series.clone();
        };

        let window = series.within(start, reference_date);

        if window.is_empty() && !series.is_empty() {
            debug!(
                period = self.token(),
                %start,
                fallback_bars = FALLBACK_BARS,
                "window holds no bars, using trailing history"
            );
            return series.tail(FALLBACK_BARS);
        }
        window
    }
}

/// Resolve a raw token against `series`, defaulting unknown tokens to `1Y`
pub fn resolve(series: &PriceSeries, token: &str, reference_date: NaiveDate) -> PriceSeries {
    Period::parse_or_default(token).resolve(series, reference_date)
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        Period::ALL
            .into_iter()
            .find(|period| period.token() == token)
            .ok_or_else(|| ForecastError::InvalidPeriodToken(s.to_string()))
    }
}

/// Lenient conversion used when deserializing: unknown tokens become `1Y`
impl From<String> for Period {
    fn from(value: String) -> Self {
        Period::parse_or_default(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.token().to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
