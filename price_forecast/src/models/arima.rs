//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and demeaned; the mean of the
//! differenced series is kept as drift. ARMA(p, q) coefficients are
//! estimated by Hannan-Rissanen two-stage least squares: a long
//! autoregression supplies residual estimates, then the series is regressed
//! on its own lags and the lagged residual estimates. With `q = 0` this is
//! a plain least squares autoregression. Estimation is closed-form, so a
//! fit either succeeds or fails; it never iterates.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::stationarity::difference;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use trade_math::ols;

/// Residual variance growth treated as a diverging MA recursion
const DIVERGENCE_RATIO: f64 = 1e6;

/// Autoregressive and moving-average orders; `d` comes from the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const DEFAULT: ArimaOrder = ArimaOrder::new(5, 0);
    pub const FALLBACK: ArimaOrder = ArimaOrder::new(1, 1);

    pub const fn new(p: usize, q: usize) -> Self {
        Self { p, q }
    }

    /// Shortest differenced series this order accepts
    pub fn min_observations(&self) -> usize {
        3 * (self.p + self.q) + 20
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Model orders tried in sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub order: ArimaOrder,
    /// Simpler order retried when `order` fails to fit
    pub fallback_order: Option<ArimaOrder>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::DEFAULT,
            fallback_order: Some(ArimaOrder::FALLBACK),
        }
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average), untrained
#[derive(Debug, Clone, Default)]
pub struct ArimaModel {
    config: ModelConfig,
}

impl ArimaModel {
    /// Create a new ARIMA model with the standard fallback order
    pub fn new(order: ArimaOrder) -> Self {
        Self::with_config(ModelConfig {
            order,
            ..ModelConfig::default()
        })
    }

    pub fn with_config(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Fit exactly `order`, without falling back
    pub fn fit_order(
        &self,
        series: &TimeSeries,
        differencing_order: usize,
        order: ArimaOrder,
    ) -> Result<FittedArima> {
        let (last_date, last_value) = series.last().ok_or_else(|| {
            ForecastError::InsufficientData("cannot fit ARIMA on an empty series".to_string())
        })?;
        if series.values().iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidSeries(
                "ARIMA input contains non-finite values".to_string(),
            ));
        }

        let mut anchors = Vec::with_capacity(differencing_order);
        let mut working = series.values().to_vec();
        for _ in 0..differencing_order {
            match working.last() {
                Some(&last) => anchors.push(last),
                None => break,
            }
            working = difference(&working);
        }

        let model_label = label(order, differencing_order);
        if working.len() < order.min_observations() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs {} differenced points, have {}",
                model_label,
                order.min_observations(),
                working.len()
            )));
        }

        let n = working.len();
        let mean = working.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = working.iter().map(|w| w - mean).collect();
        let variance = centered.iter().map(|z| z * z).sum::<f64>() / n as f64;

        let (ar, ma) = if variance <= 1e-12 * (1.0 + mean * mean) {
            debug!(model = %model_label, "differenced series is constant, fitting drift only");
            (vec![0.0; order.p], vec![0.0; order.q])
        } else {
            estimate_arma(&centered, order)
                .map_err(|err| ForecastError::Convergence(format!("{}: {}", model_label, err)))?
        };

        let residuals = arma_residuals(&centered, &ar, &ma);
        let tail: Vec<f64> = residuals.iter().skip(order.p).copied().collect();
        let sigma2 = tail.iter().map(|e| e * e).sum::<f64>() / tail.len().max(1) as f64;
        if !sigma2.is_finite() || sigma2 > DIVERGENCE_RATIO * variance.max(f64::EPSILON) {
            return Err(ForecastError::Convergence(format!(
                "{}: residual recursion diverged",
                model_label
            )));
        }

        Ok(FittedArima {
            order,
            differencing_order,
            mean,
            ar,
            ma,
            sigma2,
            recent: centered[n - order.p..].to_vec(),
            residuals: residuals[n - order.q..].to_vec(),
            anchors,
            last_date,
            last_value,
        })
    }
}

impl ForecastModel for ArimaModel {
    type Trained = FittedArima;

    /// Fit the configured order, retrying the fallback order on failure
    fn train(&self, series: &TimeSeries, differencing_order: usize) -> Result<FittedArima> {
        let primary = self.config.order;
        match self.fit_order(series, differencing_order, primary) {
            Ok(fitted) => Ok(fitted),
            Err(err) => match self.config.fallback_order {
                Some(fallback) if fallback != primary => {
                    warn!(
                        %err,
                        fallback = %label(fallback, differencing_order),
                        "ARIMA fit failed, retrying with simpler order"
                    );
                    self.fit_order(series, differencing_order, fallback)
                }
                _ => Err(err),
            },
        }
    }

    fn name(&self) -> String {
        format!("ARIMA({},d,{})", self.config.order.p, self.config.order.q)
    }
}

/// A fitted ARIMA model
///
/// Holds only the coefficients and the short state tail needed to forecast,
/// never the training series, so it can be serialized and reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedArima {
    order: ArimaOrder,
    differencing_order: usize,
    /// Mean of the differenced series (drift)
    mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    /// Last `p` centered differenced values, oldest first
    recent: Vec<f64>,
    /// Last `q` residuals, oldest first
    residuals: Vec<f64>,
    /// Last value of each differencing level, level 0 first
    anchors: Vec<f64>,
    last_date: NaiveDate,
    last_value: f64,
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn differencing_order(&self) -> usize {
        self.differencing_order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Drift of the differenced series
    pub fn drift(&self) -> f64 {
        self.mean
    }

    /// In-sample innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }
}

impl TrainedForecastModel for FittedArima {
    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        let mut history = self.recent.clone();
        let mut shocks = self.residuals.clone();
        let mut differenced = Vec::with_capacity(steps);

        for _ in 0..steps {
            let ar_part: f64 = self
                .ar
                .iter()
                .zip(history.iter().rev())
                .map(|(phi, z)| phi * z)
                .sum();
            let ma_part: f64 = self
                .ma
                .iter()
                .zip(shocks.iter().rev())
                .map(|(theta, e)| theta * e)
                .sum();
            let next = ar_part + ma_part;

            history.push(next);
            // Future innovations have zero expectation
            shocks.push(0.0);
            differenced.push(next + self.mean);
        }

        // Undo differencing, innermost level first
        let mut path = differenced;
        for &anchor in self.anchors.iter().rev() {
            let mut level = anchor;
            path = path
                .into_iter()
                .map(|step| {
                    level += step;
                    level
                })
                .collect();
        }

        if path.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Convergence(format!(
                "{} produced a non-finite forecast",
                self.name()
            )));
        }
        Ok(path)
    }

    fn last_observation(&self) -> (NaiveDate, f64) {
        (self.last_date, self.last_value)
    }

    fn name(&self) -> String {
        label(self.order, self.differencing_order)
    }
}

impl fmt::Display for FittedArima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ar={:?} ma={:?} drift={:.6}", self.name(), self.ar, self.ma, self.mean)
    }
}

fn label(order: ArimaOrder, d: usize) -> String {
    format!("ARIMA({},{},{})", order.p, d, order.q)
}

/// Hannan-Rissanen estimate of (ar, ma) for a centered series
fn estimate_arma(z: &[f64], order: ArimaOrder) -> trade_math::Result<(Vec<f64>, Vec<f64>)> {
    let ArimaOrder { p, q } = order;
    if p + q == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    let n = z.len();

    // Stage one: residual estimates from a long autoregression
    let long_order = if q > 0 {
        (2 * (p + q)).max(10).min(n / 4).max(p + q)
    } else {
        0
    };
    let mut innovations = vec![0.0; n];
    if q > 0 {
        let rows: Vec<Vec<f64>> = (long_order..n)
            .map(|t| (1..=long_order).map(|i| z[t - i]).collect())
            .collect();
        let fit = ols(&rows, &z[long_order..])?;
        innovations[long_order..].copy_from_slice(&fit.residuals);
    }

    // Stage two: regress on lagged values and lagged innovations
    let start = (long_order + q).max(p);
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            (1..=p)
                .map(|i| z[t - i])
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();
    let fit = ols(&rows, &z[start..])?;

    let ma = fit.coefficients[p..].to_vec();
    let mut ar = fit.coefficients;
    ar.truncate(p);
    Ok((ar, ma))
}

/// One-step-ahead residuals of a centered series under (ar, ma)
fn arma_residuals(z: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(z.len());
    for t in 0..z.len() {
        let ar_part: f64 = ar
            .iter()
            .enumerate()
            .filter(|(i, _)| t > *i)
            .map(|(i, phi)| phi * z[t - 1 - i])
            .sum();
        let ma_part: f64 = ma
            .iter()
            .enumerate()
            .filter(|(j, _)| t > *j)
            .map(|(j, theta)| theta * residuals[t - 1 - j])
            .sum();
        residuals.push(z[t] - ar_part - ma_part);
    }
    residuals
}
