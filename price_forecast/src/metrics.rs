//! Hold-out backtesting and forecast accuracy metrics

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Hold-out split settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Trailing points withheld from fitting
    pub holdout: usize,
    /// Shorter series report [`BacktestScore::Unavailable`]
    pub min_observations: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            holdout: 30,
            min_observations: 60,
        }
    }
}

/// RMSE of a hold-out forecast, or unavailable when no split was possible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "rmse", rename_all = "snake_case")]
pub enum BacktestScore {
    Available(f64),
    Unavailable,
}

impl BacktestScore {
    pub fn rmse(&self) -> Option<f64> {
        match self {
            BacktestScore::Available(rmse) => Some(*rmse),
            BacktestScore::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BacktestScore::Available(_))
    }
}

impl fmt::Display for BacktestScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacktestScore::Available(rmse) => write!(f, "{:.6}", rmse),
            BacktestScore::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InsufficientData(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Zero actuals are skipped rather than dividing by zero
    let mape = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy { mae, mse, rmse, mape })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}

/// Fit on all but the last `holdout` points and score the withheld tail
pub fn backtest<M: ForecastModel>(
    model: &M,
    series: &TimeSeries,
    differencing_order: usize,
    config: &BacktestConfig,
) -> Result<ForecastAccuracy> {
    let required = config.min_observations.max(config.holdout + 1);
    if series.len() < required {
        return Err(ForecastError::InsufficientData(format!(
            "backtest needs {} points, have {}",
            required,
            series.len()
        )));
    }

    let (train, test) = series.split_at(series.len() - config.holdout);
    let fitted = model.train(&train, differencing_order)?;
    let predicted = fitted.predict(config.holdout)?;
    if predicted.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Convergence(format!(
            "{} produced a non-finite backtest forecast",
            fitted.name()
        )));
    }

    forecast_accuracy(&predicted, test.values())
}

/// Hold-out RMSE, or [`BacktestScore::Unavailable`] when the series is too
/// short or the model cannot be fitted
pub fn evaluate<M: ForecastModel>(
    model: &M,
    series: &TimeSeries,
    differencing_order: usize,
    config: &BacktestConfig,
) -> BacktestScore {
    match backtest(model, series, differencing_order, config) {
        Ok(accuracy) => BacktestScore::Available(accuracy.rmse),
        Err(ForecastError::InsufficientData(reason)) => {
            debug!(%reason, "backtest unavailable");
            BacktestScore::Unavailable
        }
        Err(err) => {
            warn!(%err, "backtest failed");
            BacktestScore::Unavailable
        }
    }
}
