mod common;

use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate, Weekday};
use common::{date, random_walk, series_from_closes};
use price_forecast::error::Result;
use price_forecast::models::{ArimaModel, ArimaOrder, FittedArima, ModelConfig};
use price_forecast::{ForecastError, ForecastModel, ForecastStatus, TimeSeries, TrainedForecastModel};
use rstest::rstest;

fn walk_series(len: usize) -> TimeSeries {
    series_from_closes(&random_walk(42, len)).close_series()
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(30)]
fn test_forecast_has_exact_length_on_business_days(#[case] steps: usize) {
    let series = walk_series(300);
    let fitted = ArimaModel::default().train(&series, 1).unwrap();
    let forecast = fitted.forecast(steps);

    assert_eq!(forecast.horizons(), steps);
    assert!(!forecast.is_degraded());
    assert!(forecast.values().iter().all(|v| v.is_finite()));

    let last_observed = series.last().unwrap().0;
    assert!(forecast.dates()[0] > last_observed);
    assert!(forecast.dates().windows(2).all(|pair| pair[0] < pair[1]));
    assert!(forecast
        .dates()
        .iter()
        .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
}

#[test]
fn test_first_forecast_date_skips_weekend() {
    // 300 weekdays from 2023-01-02 end on Friday 2024-02-23
    let series = walk_series(300);
    assert_eq!(series.last().unwrap().0, date(2024, 2, 23));

    let fitted = ArimaModel::default().train(&series, 1).unwrap();
    assert_eq!(fitted.forecast(1).dates(), &[date(2024, 2, 26)]);
}

#[test]
fn test_linear_trend_continues() {
    let values: Vec<f64> = (0..400).map(|i| 100.0 + 0.5 * i as f64).collect();
    let series = series_from_closes(&values).close_series();
    let fitted = ArimaModel::default().train(&series, 1).unwrap();

    assert!((fitted.drift() - 0.5).abs() < 1e-9);
    let forecast = fitted.forecast(30);
    assert!(forecast.values().windows(2).all(|pair| pair[1] > pair[0]));
    assert!((forecast.values()[0] - 300.0).abs() < 1e-6);
}

#[test]
fn test_geometric_growth_fits_the_primary_order() {
    // Lagged differences of a geometric series are collinear
    let values: Vec<f64> = (0..400).map(|i| 50.0 * 1.005_f64.powi(i)).collect();
    let series = series_from_closes(&values).close_series();
    let fitted = ArimaModel::default().train(&series, 1).unwrap();

    assert_eq!(fitted.order(), ArimaOrder::DEFAULT);
    let forecast = fitted.forecast(30);
    assert!(forecast.values().windows(2).all(|pair| pair[1] > pair[0]));
    assert_relative_eq!(forecast.values()[0], values[399] * 1.005, max_relative = 1e-6);
}

#[test]
fn test_short_series_degrades_to_fallback_order() {
    let series = walk_series(30);
    let fitted = ArimaModel::default().train(&series, 1).unwrap();

    assert_eq!(fitted.order(), ArimaOrder::FALLBACK);
    assert_eq!(fitted.name(), "ARIMA(1,1,1)");
}

#[test]
fn test_without_fallback_short_series_fails() {
    let model = ArimaModel::with_config(ModelConfig {
        order: ArimaOrder::DEFAULT,
        fallback_order: None,
    });
    let result = model.train(&walk_series(30), 1);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_empty_series_cannot_be_fitted() {
    let result = ArimaModel::default().train(&TimeSeries::default(), 1);
    assert!(result.is_err());
}

#[test]
fn test_fitted_model_is_a_value_object() {
    let fitted = ArimaModel::default().train(&walk_series(300), 1).unwrap();
    let json = serde_json::to_string(&fitted).unwrap();
    let restored: FittedArima = serde_json::from_str(&json).unwrap();

    for (a, b) in restored.predict(10).unwrap().iter().zip(fitted.predict(10).unwrap()) {
        assert_relative_eq!(*a, b, max_relative = 1e-9);
    }
    assert_eq!(restored.last_observation(), fitted.last_observation());
}

#[test]
fn test_fitting_twice_gives_the_same_model() {
    let series = walk_series(300);
    let model = ArimaModel::new(ArimaOrder::new(2, 1));
    assert_eq!(model.train(&series, 1).unwrap(), model.train(&series, 1).unwrap());
}

#[derive(Debug)]
struct Unfittable {
    output: Option<Vec<f64>>,
}

impl TrainedForecastModel for Unfittable {
    fn predict(&self, _steps: usize) -> Result<Vec<f64>> {
        self.output
            .clone()
            .ok_or_else(|| ForecastError::Convergence("no estimate".to_string()))
    }

    fn last_observation(&self) -> (NaiveDate, f64) {
        (date(2024, 3, 1), 42.0)
    }

    fn name(&self) -> String {
        "unfittable".to_string()
    }
}

#[rstest]
#[case(None)]
#[case(Some(vec![1.0, f64::NAN, 3.0]))]
#[case(Some(vec![1.0]))]
fn test_failed_prediction_is_flat(#[case] output: Option<Vec<f64>>) {
    let forecast = Unfittable { output }.forecast(3);

    assert_eq!(forecast.values(), &[42.0, 42.0, 42.0]);
    assert_eq!(
        forecast.dates(),
        &[date(2024, 3, 4), date(2024, 3, 5), date(2024, 3, 6)]
    );
    assert!(matches!(forecast.status(), ForecastStatus::Flat { .. }));
    assert!(forecast.is_degraded());
}

#[test]
fn test_status_serializes_with_kind_tag() {
    let forecast = Unfittable { output: None }.forecast(1);
    let json = forecast.to_json().unwrap();
    assert!(json.contains(r#""kind":"flat""#), "{}", json);
}
