//! Shared fixtures for core integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use scanlab_core::domain::{Interval, PriceBar, PriceSeries};

/// Daily series from closes, one bar per calendar day from 2024-01-02.
pub fn series(closes: &[f64]) -> PriceSeries {
    series_for("TEST", closes)
}

pub fn series_for(symbol: &str, closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: base + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
        })
        .collect();
    PriceSeries::new(symbol, Interval::Daily, bars).unwrap()
}

/// Long decline followed by a sharp rally; ends with fast EMA above slow.
pub fn dip_then_rally() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 120.0 - i as f64).collect();
    closes.extend((0..6).map(|i| 95.0 + 6.0 * i as f64));
    closes
}
