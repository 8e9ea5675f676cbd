mod common;

use common::{date, weekdays};
use pretty_assertions::assert_eq;
use price_forecast::{ForecastError, PriceBar, PriceSeries, TimeSeries};

#[test]
fn test_csv_with_all_columns() {
    let csv = "Date,Open,High,Low,Close,Volume\n\
               2024-01-02,100.0,105.0,98.0,103.0,1000\n\
               2024-01-03,103.0,107.0,101.0,106.0,1200.4\n";
    let series = PriceSeries::from_csv_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 2);
    let last = series.last_bar().unwrap();
    assert_eq!(last.ohlc(), (103.0, 107.0, 101.0, 106.0));
    assert_eq!(last.volume, Some(1200));
}

#[test]
fn test_csv_close_only_substitutes_close() {
    let csv = "date,close\n2024-01-03,11.0\n2024-01-02,10.0\n";
    let series = PriceSeries::from_csv_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.dates(), vec![date(2024, 1, 2), date(2024, 1, 3)]);
    let first = series.first_bar().unwrap();
    assert_eq!(first.open(), 10.0);
    assert_eq!(first.high(), 10.0);
    assert_eq!(first.low(), 10.0);
    assert_eq!(first.volume, None);
}

#[test]
fn test_csv_rows_without_close_are_skipped() {
    let csv = "Date,Open,Close\n2024-01-02,9.5,\n2024-01-03,10.0,10.5\n";
    let series = PriceSeries::from_csv_reader(csv.as_bytes()).unwrap();
    assert_eq!(series.closes(), vec![10.5]);
}

#[test]
fn test_csv_duplicate_dates_rejected() {
    let csv = "Date,Close\n2024-01-02,1.0\n2024-01-02,2.0\n";
    let result = PriceSeries::from_csv_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
}

#[test]
fn test_csv_bad_date_is_csv_error() {
    let csv = "Date,Close\nnot-a-date,1.0\n";
    let result = PriceSeries::from_csv_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::Csv(_))));
}

#[test]
fn test_negative_price_rejected() {
    let result = PriceSeries::new(vec![PriceBar::new(date(2024, 1, 2), -1.0)]);
    assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
}

#[test]
fn test_mismatched_closes_rejected() {
    let result = PriceSeries::from_closes(weekdays(date(2024, 1, 2), 3), vec![1.0, 2.0]);
    assert!(result.is_err());
}

#[test]
fn test_gaps_are_kept_as_is() {
    let series = PriceSeries::from_closes(
        vec![date(2024, 1, 2), date(2024, 1, 9)],
        vec![10.0, 12.0],
    )
    .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.close_series().values(), &[10.0, 12.0]);
}

#[test]
fn test_daily_change() {
    let series = PriceSeries::from_closes(weekdays(date(2024, 1, 2), 3), vec![10.0, 12.0, 11.5])
        .unwrap();
    let change = series.daily_change().unwrap();
    assert_eq!(change.close, 11.5);
    assert_eq!(change.change, -0.5);

    let single = series.tail(1).daily_change().unwrap();
    assert_eq!(single.change, 0.0);
    assert!(PriceSeries::empty().daily_change().is_none());
}

#[test]
fn test_tail_and_since() {
    let dates = weekdays(date(2024, 1, 1), 10);
    let series = PriceSeries::from_closes(dates.clone(), (0..10).map(f64::from).collect()).unwrap();

    assert_eq!(series.tail(3).closes(), vec![7.0, 8.0, 9.0]);
    assert_eq!(series.tail(50).len(), 10);
    assert_eq!(series.since(dates[8]).closes(), vec![8.0, 9.0]);
}

#[test]
fn test_price_series_within() {
    let dates = weekdays(date(2024, 1, 1), 10);
    let series = PriceSeries::from_closes(dates.clone(), (0..10).map(f64::from).collect()).unwrap();

    assert_eq!(series.within(dates[2], dates[4]).closes(), vec![2.0, 3.0, 4.0]);
    // Bounds between bars keep only the bars inside
    assert_eq!(
        series.within(date(2024, 1, 6), date(2024, 1, 9)).closes(),
        vec![5.0, 6.0]
    );
    assert!(series.within(dates[5], dates[1]).is_empty());
    assert!(PriceSeries::empty().within(dates[0], dates[9]).is_empty());
}

#[test]
fn test_time_series_rejects_unordered_dates() {
    let result = TimeSeries::new(vec![date(2024, 1, 3), date(2024, 1, 2)], vec![1.0, 2.0]);
    assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
}

#[test]
fn test_time_series_within_and_concat() {
    let dates = weekdays(date(2024, 1, 1), 5);
    let series = TimeSeries::new(dates.clone(), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

    assert_eq!(series.within(dates[1], dates[3]).values(), &[2.0, 3.0, 4.0]);
    assert!(series.within(dates[4], dates[0]).is_empty());

    let (head, tail) = series.split_at(2);
    assert_eq!(head.concat(&tail).unwrap(), series);
    assert!(tail.concat(&head).is_err());
}
