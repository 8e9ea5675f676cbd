//! Synthetic price series shared by the integration tests

#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use price_forecast::PriceSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive weekdays starting at `start` (or the next weekday)
pub fn weekdays(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = start;
    while dates.len() < count {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}

/// Close-only series on consecutive weekdays from 2023-01-02
pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(weekdays(date(2023, 1, 2), closes.len()), closes.to_vec()).unwrap()
}

/// Random walk starting at 100 with uniform steps in `[-0.5, 0.5)`
pub fn random_walk(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level: f64 = 100.0;
    (0..len)
        .map(|_| {
            level += rng.gen_range(-0.5..0.5);
            level
        })
        .collect()
}
