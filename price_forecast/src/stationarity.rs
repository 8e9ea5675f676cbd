//! Stationarity analysis and differencing order selection
//!
//! The differencing order is chosen by repeatedly applying an augmented
//! Dickey-Fuller test (constant, no trend) and differencing while the unit
//! root cannot be rejected.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};
use trade_math::{ols, MathError, OlsFit};

/// Order returned when the test cannot be run or fails numerically
pub const FALLBACK_ORDER: usize = 1;

/// Fewest points the ADF regression itself accepts
const MIN_ADF_OBSERVATIONS: usize = 8;

// MacKinnon (1994) response surface, constant-only regression, one series.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Tunables for differencing order selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationarityConfig {
    /// p-value at or below which the series is treated as stationary
    pub significance: f64,
    /// Most differences ever applied
    pub max_order: usize,
    /// Shorter series skip the test and get [`FALLBACK_ORDER`]
    pub min_observations: usize,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            max_order: 2,
            min_observations: 20,
        }
    }
}

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient
    pub statistic: f64,
    /// Approximate p-value of the unit-root null
    pub p_value: f64,
    /// Number of lagged differences selected by AIC
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
}

/// Augmented Dickey-Fuller test with a constant
///
/// The lag length is selected by AIC over `0..=ceil(12 * (n/100)^(1/4))`
/// on a common sample, then the chosen regression is refit on every
/// available observation.
pub fn adf_test(values: &[f64]) -> Result<AdfResult> {
    if values.len() < MIN_ADF_OBSERVATIONS {
        return Err(ForecastError::InsufficientData(format!(
            "ADF test needs at least {} points, have {}",
            MIN_ADF_OBSERVATIONS,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidSeries(
            "ADF test input contains non-finite values".to_string(),
        ));
    }

    let diffs = difference(values);
    let nobs = diffs.len();

    let mean = diffs.iter().sum::<f64>() / nobs as f64;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / nobs as f64;
    if variance <= f64::EPSILON * (1.0 + mean * mean) {
        return Err(ForecastError::Math(MathError::CalculationError(
            "first differences have no variance".to_string(),
        )));
    }

    let max_lag = ((12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize)
        .min((nobs / 2).saturating_sub(2));

    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lag {
        let aic = adf_regression(values, &diffs, lag, max_lag)?.aic();
        if best.map_or(true, |(_, best_aic)| aic < best_aic) {
            best = Some((lag, aic));
        }
    }
    let used_lag = best.map(|(lag, _)| lag).unwrap_or(0);

    let fit = adf_regression(values, &diffs, used_lag, used_lag)?;
    let statistic = fit.t_stat(1)?;
    if !statistic.is_finite() {
        return Err(ForecastError::Math(MathError::CalculationError(
            "ADF statistic is not finite".to_string(),
        )));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic)?,
        used_lag,
        nobs: fit.nobs,
    })
}

/// `diff[t] = a + b * level[t] + sum(c_i * diff[t - i])` for `t >= start`
fn adf_regression(levels: &[f64], diffs: &[f64], lag: usize, start: usize) -> Result<OlsFit> {
    let mut rows = Vec::with_capacity(diffs.len().saturating_sub(start));
    let mut response = Vec::with_capacity(rows.capacity());
    for t in start..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(levels[t]);
        row.extend((1..=lag).map(|i| diffs[t - i]));
        rows.push(row);
        response.push(diffs[t]);
    }
    Ok(ols(&rows, &response)?)
}

/// Approximate p-value for the constant-only ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Math(MathError::CalculationError(e.to_string())))?;
    Ok(normal.cdf(z))
}

/// First differences: `out[i] = values[i + 1] - values[i]`
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Chooses how many times a series must be differenced
#[derive(Debug, Clone, Default)]
pub struct StationarityAnalyzer {
    config: StationarityConfig,
}

impl StationarityAnalyzer {
    pub fn new(config: StationarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StationarityConfig {
        &self.config
    }

    /// Differencing order in `0..=max_order`
    ///
    /// Series shorter than `min_observations` skip the test and any
    /// numerical failure of the test yields [`FALLBACK_ORDER`].
    pub fn differencing_order(&self, values: &[f64]) -> usize {
        if values.len() < self.config.min_observations {
            debug!(
                len = values.len(),
                min = self.config.min_observations,
                "series too short for stationarity test"
            );
            return FALLBACK_ORDER;
        }

        match self.try_differencing_order(values) {
            Ok(order) => order,
            Err(err) => {
                warn!(%err, fallback = FALLBACK_ORDER, "stationarity test failed");
                FALLBACK_ORDER
            }
        }
    }

    /// Differencing order, surfacing test failures
    pub fn try_differencing_order(&self, values: &[f64]) -> Result<usize> {
        let mut current = values.to_vec();
        for order in 0..self.config.max_order {
            let result = adf_test(&current)?;
            debug!(
                order,
                statistic = result.statistic,
                p_value = result.p_value,
                lag = result.used_lag,
                "ADF test"
            );
            if result.p_value <= self.config.significance {
                return Ok(order);
            }
            current = difference(&current);
        }
        Ok(self.config.max_order)
    }
}

/// Differencing order of `series` with the default configuration
pub fn differencing_order(series: &TimeSeries) -> usize {
    StationarityAnalyzer::default().differencing_order(series.values())
}
