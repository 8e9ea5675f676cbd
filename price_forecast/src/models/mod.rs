//! Forecasting models for time series data

use crate::data::TimeSeries;
use crate::error::Result;
use crate::scaling::Rescalable;
use crate::utils::business_days_after;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::warn;

pub mod arima;

pub use arima::{ArimaModel, ArimaOrder, FittedArima, ModelConfig};

/// Default forecast horizon in business days
pub const DEFAULT_HORIZON: usize = 30;

/// How a forecast was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastStatus {
    /// Produced by a fitted model
    Fitted { model: String },
    /// Last observed value repeated after a failure
    Flat { reason: String },
    /// Nothing could be produced because there was no history at all
    Empty { reason: String },
}

/// Forecast points dated on the business days after the last observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    points: TimeSeries,
    status: ForecastStatus,
}

impl ForecastResult {
    /// Forecast produced by a fitted model
    pub fn fitted(last_date: NaiveDate, values: Vec<f64>, model: impl Into<String>) -> Self {
        let dates = business_days_after(last_date, values.len());
        Self {
            points: TimeSeries::from_parts(dates, values),
            status: ForecastStatus::Fitted {
                model: model.into(),
            },
        }
    }

    /// `last_value` repeated for `steps` business days
    pub fn flat(
        last_date: NaiveDate,
        last_value: f64,
        steps: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            points: TimeSeries::from_parts(
                business_days_after(last_date, steps),
                vec![last_value; steps],
            ),
            status: ForecastStatus::Flat {
                reason: reason.into(),
            },
        }
    }

    /// No forecast, for inputs without any observation
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            points: TimeSeries::default(),
            status: ForecastStatus::Empty {
                reason: reason.into(),
            },
        }
    }

    pub fn points(&self) -> &TimeSeries {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        self.points.values()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.points.dates()
    }

    /// Number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.points.len()
    }

    pub fn status(&self) -> &ForecastStatus {
        &self.status
    }

    /// Whether this is a fallback rather than a model output
    pub fn is_degraded(&self) -> bool {
        !matches!(self.status, ForecastStatus::Fitted { .. })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Rescalable for ForecastResult {
    fn map_scaled(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self.points.map_values(f),
            status: self.status.clone(),
        }
    }

    fn has_values(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Raw predictions for the next `steps` periods on the fitted scale
    fn predict(&self, steps: usize) -> Result<Vec<f64>>;

    /// Date and value of the last observation the model was fitted on
    fn last_observation(&self) -> (NaiveDate, f64);

    /// Name of the model
    fn name(&self) -> String;

    /// Forecast `steps` business days ahead
    ///
    /// Always returns exactly `steps` points. A prediction error or a
    /// non-finite prediction degrades to a flat forecast of the last
    /// observed value.
    fn forecast(&self, steps: usize) -> ForecastResult {
        let (last_date, last_value) = self.last_observation();
        match self.predict(steps) {
            Ok(values) if values.len() == steps && values.iter().all(|v| v.is_finite()) => {
                ForecastResult::fitted(last_date, values, self.name())
            }
            Ok(_) => {
                warn!(model = %self.name(), "non-finite forecast, using flat fallback");
                ForecastResult::flat(last_date, last_value, steps, "non-finite forecast")
            }
            Err(err) => {
                warn!(model = %self.name(), %err, "forecast failed, using flat fallback");
                ForecastResult::flat(last_date, last_value, steps, err.to_string())
            }
        }
    }
}

/// Forecast model that can be trained on time series data
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit on `series` after differencing it `differencing_order` times
    fn train(&self, series: &TimeSeries, differencing_order: usize) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> String;
}
