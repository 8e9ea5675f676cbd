//! End-to-end forecast orchestration
//!
//! smooth -> differencing order -> min-max scale -> backtest + fit ->
//! forecast -> invert. Every stage failure is absorbed into a degraded but
//! well-formed [`PipelineOutput`]; `run` never returns an error.

use crate::config::PipelineConfig;
use crate::data::{PriceSeries, TimeSeries};
use crate::metrics::{evaluate, BacktestScore};
use crate::models::{ArimaModel, FittedArima, ForecastModel, ForecastResult, TrainedForecastModel};
use crate::scaling::{self, ScalingParameters};
use crate::smoothing::smooth_closes;
use crate::stationarity::StationarityAnalyzer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything a forecast request produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Forecast in price units
    pub forecast: ForecastResult,
    /// Hold-out RMSE on the scaled series
    pub backtest: BacktestScore,
    pub differencing_order: usize,
    /// Parameters that map scaled values back to prices, when a fit happened
    pub scaling: Option<ScalingParameters>,
    /// Smoothed close history the model saw, in price units
    pub smoothed: TimeSeries,
    /// Fitted model on the scaled series, for callers that persist it
    pub model: Option<FittedArima>,
}

impl PipelineOutput {
    /// Whether the forecast or the score is a fallback
    pub fn is_degraded(&self) -> bool {
        self.forecast.is_degraded() || !self.backtest.is_available()
    }

    /// Smoothed history followed by the forecast, for charting
    pub fn history_with_forecast(&self) -> TimeSeries {
        self.smoothed
            .concat(self.forecast.points())
            .unwrap_or_else(|err| {
                warn!(%err, "forecast overlaps history, charting history only");
                self.smoothed.clone()
            })
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Runs the forecast stages with one configuration
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    config: PipelineConfig,
}

impl ForecastPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Forecast `config.horizon` business days past the last bar
    pub fn run(&self, series: &PriceSeries) -> PipelineOutput {
        let horizon = self.config.horizon;
        let analyzer = StationarityAnalyzer::new(self.config.stationarity);

        let Some(last_bar) = series.last_bar() else {
            debug!("empty price series, nothing to forecast");
            return PipelineOutput {
                forecast: ForecastResult::empty("no price history"),
                backtest: BacktestScore::Unavailable,
                differencing_order: analyzer.differencing_order(&[]),
                scaling: None,
                smoothed: TimeSeries::default(),
                model: None,
            };
        };

        let smoothed = smooth_closes(series, self.config.smoothing_window);
        let differencing_order = analyzer.differencing_order(smoothed.values());

        if smoothed.is_empty() {
            warn!(
                len = series.len(),
                window = self.config.smoothing_window,
                "series shorter than smoothing window, using flat forecast"
            );
            return PipelineOutput {
                forecast: ForecastResult::flat(
                    last_bar.date,
                    last_bar.close,
                    horizon,
                    "series shorter than smoothing window",
                ),
                backtest: BacktestScore::Unavailable,
                differencing_order,
                scaling: None,
                smoothed,
                model: None,
            };
        }

        let scaled = match scaling::fit(&smoothed) {
            Ok(scaled) => scaled,
            Err(err) => {
                warn!(%err, "scaling failed, using flat forecast");
                let forecast = match smoothed.last() {
                    Some((date, value)) => ForecastResult::flat(date, value, horizon, err.to_string()),
                    None => ForecastResult::empty(err.to_string()),
                };
                return PipelineOutput {
                    forecast,
                    backtest: BacktestScore::Unavailable,
                    differencing_order,
                    scaling: None,
                    smoothed,
                    model: None,
                };
            }
        };

        let model = ArimaModel::with_config(self.config.model.clone());
        let backtest = evaluate(&model, &scaled.series, differencing_order, &self.config.backtest);

        let (scaled_forecast, fitted) = match model.train(&scaled.series, differencing_order) {
            Ok(fitted) => (fitted.forecast(horizon), Some(fitted)),
            Err(err) => {
                warn!(%err, model = %model.name(), "no ARIMA order could be fitted, using flat forecast");
                let forecast = match scaled.series.last() {
                    Some((date, value)) => ForecastResult::flat(date, value, horizon, err.to_string()),
                    None => ForecastResult::empty(err.to_string()),
                };
                (forecast, None)
            }
        };

        debug!(
            differencing_order,
            backtest = %backtest,
            degraded = scaled_forecast.is_degraded(),
            "forecast complete"
        );

        PipelineOutput {
            forecast: scaling::invert(Some(&scaled.params), &scaled_forecast),
            backtest,
            differencing_order,
            scaling: Some(scaled.params),
            smoothed,
            model: fitted,
        }
    }
}

/// Run the pipeline with the default configuration
pub fn forecast(series: &PriceSeries) -> PipelineOutput {
    ForecastPipeline::default().run(series)
}
