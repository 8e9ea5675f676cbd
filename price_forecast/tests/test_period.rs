mod common;

use chrono::NaiveDate;
use common::{date, weekdays};
use price_forecast::period::{resolve, FALLBACK_BARS};
use price_forecast::{ForecastError, Period, PriceSeries};
use rstest::rstest;

/// Weekday closes from 2018-01-01 through 2024-06-28 (a Friday)
fn history() -> PriceSeries {
    let dates: Vec<NaiveDate> = weekdays(date(2018, 1, 1), 2000)
        .into_iter()
        .filter(|d| *d <= date(2024, 6, 28))
        .collect();
    let closes = (0..dates.len()).map(|i| 50.0 + i as f64 * 0.01).collect();
    PriceSeries::from_closes(dates, closes).unwrap()
}

#[rstest]
#[case("5D", date(2024, 6, 21))]
#[case("1M", date(2024, 5, 29))]
#[case("6M", date(2023, 12, 29))]
#[case("YTD", date(2024, 1, 1))]
#[case("1Y", date(2023, 6, 29))]
#[case("5Y", date(2019, 6, 30))]
fn test_window_bounds(#[case] token: &str, #[case] start: NaiveDate) {
    let reference = date(2024, 6, 28);
    let window = resolve(&history(), token, reference);

    assert!(!window.is_empty());
    assert!(window.first_bar().unwrap().date >= start);
    assert_eq!(window.last_bar().unwrap().date, reference);

    // Nothing before the start was dropped
    let full = history();
    let skipped = full.bars().iter().filter(|bar| bar.date >= start).count();
    assert_eq!(window.len(), skipped);
}

#[test]
fn test_window_ends_at_reference_date() {
    // Bars after the reference date are outside every window
    let series = history();
    let reference = date(2024, 3, 15);
    let window = Period::OneMonth.resolve(&series, reference);

    assert_eq!(window.last_bar().unwrap().date, reference);
    assert_eq!(window, series.within(date(2024, 2, 14), reference));
}

#[test]
fn test_five_days_spans_a_week() {
    let window = resolve(&history(), "5D", date(2024, 6, 28));
    assert_eq!(window.len(), 6);
}

#[rstest]
#[case("max")]
#[case("MAX")]
#[case(" Max ")]
fn test_max_returns_everything(#[case] token: &str) {
    let series = history();
    assert_eq!(resolve(&series, token, date(2024, 6, 28)), series);
}

#[test]
fn test_tokens_are_case_insensitive() {
    assert_eq!("ytd".parse::<Period>().unwrap(), Period::YearToDate);
    assert_eq!("1y".parse::<Period>().unwrap(), Period::OneYear);
    assert_eq!(Period::SixMonths.to_string(), "6M");
}

#[test]
fn test_unknown_token_defaults_to_one_year() {
    let series = history();
    let reference = date(2024, 6, 28);
    assert!(matches!(
        "2W".parse::<Period>(),
        Err(ForecastError::InvalidPeriodToken(_))
    ));
    assert_eq!(
        resolve(&series, "2W", reference),
        resolve(&series, "1Y", reference)
    );
}

#[test]
fn test_stale_history_falls_back_to_trailing_bars() {
    // History ends long before the reference date
    let series = history();
    let window = resolve(&series, "1M", date(2026, 3, 2));
    assert_eq!(window.len(), FALLBACK_BARS);
    assert_eq!(window.last_bar(), series.last_bar());
}

#[test]
fn test_short_stale_history_falls_back_to_all_bars() {
    let series = history().tail(40);
    let window = resolve(&series, "5D", date(2026, 3, 2));
    assert_eq!(window, series);
}

#[test]
fn test_empty_series_stays_empty() {
    let window = Period::OneMonth.resolve(&PriceSeries::empty(), date(2024, 6, 28));
    assert!(window.is_empty());
}

#[test]
fn test_period_serializes_as_token() {
    let json = serde_json::to_string(&Period::YearToDate).unwrap();
    assert_eq!(json, "\"YTD\"");
    let parsed: Period = serde_json::from_str("\"5y\"").unwrap();
    assert_eq!(parsed, Period::FiveYears);
}

#[test]
fn test_unknown_token_deserializes_as_one_year() {
    let parsed: Period = serde_json::from_str("\"2W\"").unwrap();
    assert_eq!(parsed, Period::OneYear);
}
