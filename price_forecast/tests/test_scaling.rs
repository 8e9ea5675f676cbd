mod common;

use approx::assert_abs_diff_eq;
use common::{random_walk, series_from_closes};
use price_forecast::scaling::{fit, invert, try_invert};
use price_forecast::{ForecastError, ScalingParameters, TimeSeries};

#[test]
fn test_round_trip_restores_series() {
    let original = series_from_closes(&random_walk(5, 250)).close_series();
    let scaled = fit(&original).unwrap();
    let restored = invert(Some(&scaled.params), &scaled.series);

    assert_eq!(restored.dates(), original.dates());
    for (a, b) in restored.values().iter().zip(original.values()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn test_scaled_values_span_unit_interval() {
    let original = series_from_closes(&[12.0, 8.0, 10.0, 20.0]).close_series();
    let scaled = fit(&original).unwrap();

    assert_eq!(scaled.params, ScalingParameters { min: 8.0, max: 20.0 });
    assert_eq!(scaled.series.values(), &[1.0 / 3.0, 0.0, 1.0 / 6.0, 1.0]);
}

#[test]
fn test_values_outside_fitted_range_invert_linearly() {
    let params = ScalingParameters { min: 10.0, max: 20.0 };
    let restored = invert(Some(&params), &vec![-0.5, 1.5]);
    assert_eq!(restored, vec![5.0, 25.0]);
}

#[test]
fn test_constant_series_uses_unit_range() {
    let original = series_from_closes(&[7.0; 5]).close_series();
    let scaled = fit(&original).unwrap();

    assert!(scaled.series.values().iter().all(|v| *v == 0.0));
    assert_eq!(invert(Some(&scaled.params), &scaled.series), original);
}

#[test]
fn test_missing_parameters_return_input() {
    let values = vec![0.25, 0.5];
    assert_eq!(invert(None, &values), values);
    assert!(matches!(
        try_invert(None, &values),
        Err(ForecastError::Scaling(_))
    ));
}

#[test]
fn test_malformed_parameters_return_input() {
    let params = ScalingParameters { min: 5.0, max: 1.0 };
    let values = vec![0.25, 0.5];
    assert_eq!(invert(Some(&params), &values), values);

    let nan = ScalingParameters {
        min: f64::NAN,
        max: 1.0,
    };
    assert_eq!(invert(Some(&nan), &values), values);
}

#[test]
fn test_empty_input_is_returned_unchanged() {
    let params = ScalingParameters { min: 1.0, max: 2.0 };
    assert!(invert(Some(&params), &Vec::<f64>::new()).is_empty());
    assert!(invert(Some(&params), &TimeSeries::default()).is_empty());
}

#[test]
fn test_fit_rejects_empty_series() {
    assert!(matches!(
        fit(&TimeSeries::default()),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_parameters_survive_serialization() {
    let params = ScalingParameters { min: 101.5, max: 187.25 };
    let json = serde_json::to_string(&params).unwrap();
    let restored: ScalingParameters = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, params);
}
