//! Utility functions for the price_forecast crate

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Whether `date` falls on Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `count` business days strictly after `last`
///
/// Exchange holidays are not modelled; only weekends are skipped.
pub fn business_days_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = last;
    while dates.len() < count {
        current += Duration::days(1);
        if is_business_day(current) {
            dates.push(current);
        }
    }
    dates
}
