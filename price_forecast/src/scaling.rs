//! Reversible min-max normalization
//!
//! Values observed during fitting map into `[0, 1]`. Forecasts may leave
//! that range; inversion still maps them back linearly.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Minimum and maximum of the series a scaler was fitted on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    pub min: f64,
    pub max: f64,
}

impl ScalingParameters {
    /// Fit parameters over `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData(
                "cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Scaling(
                "cannot fit a scaler on non-finite values".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { min, max })
    }

    /// Check the parameters can invert values
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(ForecastError::Scaling(format!(
                "malformed scaling parameters: min={}, max={}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Width of the fitted range; a constant series uses unit width
    fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    pub fn unscale(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }
}

/// A normalized series together with the parameters that invert it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledSeries {
    pub series: TimeSeries,
    pub params: ScalingParameters,
}

/// Containers whose values can be rescaled in place of their index
pub trait Rescalable: Sized {
    /// Same container with every value passed through `f`
    fn map_scaled(&self, f: impl Fn(f64) -> f64) -> Self;

    fn has_values(&self) -> bool;
}

impl Rescalable for Vec<f64> {
    fn map_scaled(&self, f: impl Fn(f64) -> f64) -> Self {
        self.iter().map(|&v| f(v)).collect()
    }

    fn has_values(&self) -> bool {
        !self.is_empty()
    }
}

impl Rescalable for TimeSeries {
    fn map_scaled(&self, f: impl Fn(f64) -> f64) -> Self {
        self.map_values(f)
    }

    fn has_values(&self) -> bool {
        !self.is_empty()
    }
}

/// Fit min-max parameters on `series` and normalize it
pub fn fit(series: &TimeSeries) -> Result<ScaledSeries> {
    let params = ScalingParameters::fit(series.values())?;
    Ok(ScaledSeries {
        series: series.map_values(|v| params.scale(v)),
        params,
    })
}

/// Invert a scaled container back to price units, failing on bad parameters
pub fn try_invert<T: Rescalable>(params: Option<&ScalingParameters>, input: &T) -> Result<T> {
    let params = params.ok_or_else(|| {
        ForecastError::Scaling("no scaling parameters supplied".to_string())
    })?;
    params.validate()?;
    Ok(input.map_scaled(|v| params.unscale(v)))
}

/// Invert a scaled container back to price units
///
/// Missing or malformed parameters return the input unchanged, as does an
/// empty input. Indexed inputs keep their dates.
pub fn invert<T: Rescalable + Clone>(params: Option<&ScalingParameters>, input: &T) -> T {
    if !input.has_values() {
        return input.clone();
    }
    try_invert(params, input).unwrap_or_else(|err| {
        warn!(%err, "returning values unscaled");
        input.clone()
    })
}
