//! Forecast and chart indicators for one ticker
//!
//! ```bash
//! cargo run -p price_forecast --example forecast_demo -- AAPL prices.csv
//! ```
//!
//! Without a CSV path a synthetic series is used. Set `RUST_LOG=debug` to
//! see every fallback the engine takes.

use chrono::{Duration, NaiveDate};
use price_forecast::cache::{CacheKey, Memoizer};
use price_forecast::profile::{normalize_ticker, CompanyProfile};
use price_forecast::{
    ForecastPipeline, IndicatorConfig, IndicatorEngine, Period, PipelineConfig, PipelineOutput,
    PriceSeries,
};
use std::fs::File;
use std::time::Duration as Ttl;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_forecast=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let raw_ticker = args.next().unwrap_or_else(|| "demo".to_string());
    let Some(ticker) = normalize_ticker(&raw_ticker) else {
        eprintln!("Invalid ticker {:?}", raw_ticker);
        return Ok(());
    };

    println!("Price Forecast: {}", ticker);
    println!("====================\n");

    let series = match args.next() {
        Some(path) => load_csv(&path)?,
        None => create_sample_series(),
    };
    let (Some(first), Some(last)) = (series.first_bar(), series.last_bar()) else {
        println!("No price data for {}", ticker);
        return Ok(());
    };
    println!(
        "Loaded {} bars from {} to {}",
        series.len(),
        first.date,
        last.date
    );
    if let Some(change) = series.daily_change() {
        println!("Last close {:.2} ({:+.2})\n", change.close, change.change);
    }

    let profile = CompanyProfile::from_json(
        r#"{"marketCap": 1.2e11, "beta": 1.1, "trailingPE": 18.4,
            "longBusinessSummary": "Synthetic company used for the demo."}"#,
    )?;
    println!("{}", profile.summary());
    for (label, value) in profile.key_metrics() {
        match value {
            Some(value) => println!("  {:<14} {}", label, value),
            None => println!("  {:<14} N/A", label),
        }
    }

    // Repeated requests within the TTL reuse the first result
    let cache: Memoizer<PipelineOutput> = Memoizer::new(Ttl::from_secs(300));
    let pipeline = ForecastPipeline::new(PipelineConfig::default());
    let key = CacheKey::new(&ticker, first.date, last.date, "forecast");
    let output = cache.get_or_compute(key.clone(), || pipeline.run(&series));
    let _ = cache.get_or_compute(key, || pipeline.run(&series));

    println!("\nDifferencing order: {}", output.differencing_order);
    println!("Backtest RMSE (scaled): {}", output.backtest);
    println!("Status: {:?}", output.forecast.status());
    println!("\nNext 5 business days:");
    for (date, value) in output.forecast.points().iter().take(5) {
        println!("  {}: {:.2}", date, value);
    }

    let engine = IndicatorEngine::new();
    for config in [
        IndicatorConfig::rsi(Period::OneMonth, 14),
        IndicatorConfig::macd(Period::SixMonths),
        IndicatorConfig::moving_average(Period::OneYear, 20, 50),
    ] {
        let set = engine.compute(&series, &config, last.date)?;
        println!("\n{} window ({} bars):", set.period, set.close.len());
        for line in &set.lines {
            match line.points.last() {
                Some((date, value)) => println!("  {:<10} {:>10.4} on {}", line.name, value, date),
                None => println!("  {:<10} {:>10}", line.name, "n/a"),
            }
        }
    }

    Ok(())
}

fn load_csv(path: &str) -> price_forecast::error::Result<PriceSeries> {
    let file = File::open(path)?;
    PriceSeries::from_csv_reader(file)
}

fn create_sample_series() -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default();
    let mut dates = Vec::new();
    let mut closes = Vec::new();
    let mut day = start;
    let mut i = 0;
    while closes.len() < 400 {
        if price_forecast::utils::is_business_day(day) {
            let t = i as f64;
            closes.push(150.0 + 0.08 * t + 6.0 * (t / 15.0).sin() + 2.0 * (t / 4.0).cos());
            dates.push(day);
            i += 1;
        }
        day += Duration::days(1);
    }
    PriceSeries::from_closes(dates, closes).unwrap_or_default()
}
