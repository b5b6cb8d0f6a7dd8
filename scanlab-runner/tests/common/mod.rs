//! Shared fixtures for runner integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{Duration, NaiveDate};
use scanlab_core::data::{DataError, DataProvider};
use scanlab_core::domain::{Interval, Period, PriceBar, PriceSeries};
use scanlab_runner::{ScanConfig, ScanState, ScanStore, StoreError};

/// Decline then a sharp rally: golden cross plus continuation on the last bars.
pub fn rally() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 120.0 - i as f64).collect();
    closes.extend((0..6).map(|i| 95.0 + 6.0 * i as f64));
    closes
}

/// Steady decline: never signals.
pub fn decline() -> Vec<f64> {
    (0..40).map(|i| 200.0 - 2.0 * i as f64).collect()
}

pub fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
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

/// Scripted provider: known symbols return fixed closes, anything else is not found.
#[derive(Default)]
pub struct FixtureProvider {
    closes: HashMap<String, Vec<f64>>,
    fetches: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.closes.insert(symbol.to_string(), closes);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// When each fetch began, in start order.
    pub fn fetch_starts(&self) -> Vec<Instant> {
        let mut starts = self
            .starts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        starts.sort();
        starts
    }
}

impl DataProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<PriceSeries, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.starts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Instant::now());
        match self.closes.get(symbol) {
            Some(closes) => Ok(series(symbol, closes)),
            None => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn native_intervals(&self) -> &[Interval] {
        &[Interval::Daily]
    }
}

/// Provider with rally/decline/short/missing tickers mixed.
pub fn mixed_provider() -> FixtureProvider {
    FixtureProvider::new()
        .with("UP1", rally())
        .with("UP2", rally())
        .with("DOWN1", decline())
        .with("DOWN2", decline())
        .with("SHORT", vec![100.0])
}

/// Any signal qualifies, so hits depend only on the detector.
pub fn permissive_config(batch: usize) -> ScanConfig {
    let mut config = ScanConfig::default();
    config.filter.min_win_rate = 0.0;
    config.filter.min_profit_factor = 0.0;
    config.filter.min_samples = 0;
    config.scan.checkpoint_batch_size = batch;
    config
}

/// Store whose saves always fail.
pub struct BrokenStore;

impl ScanStore for BrokenStore {
    fn load(&self) -> Result<Option<ScanState>, StoreError> {
        Ok(None)
    }

    fn save(&self, _state: &ScanState) -> Result<(), StoreError> {
        Err(StoreError::Serialize("disk full".into()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
