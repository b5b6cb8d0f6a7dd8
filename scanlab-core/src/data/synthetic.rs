//! Synthetic data provider for offline runs, demos and tests.
//!
//! Every symbol gets its own reproducible random walk: the RNG is seeded from a
//! BLAKE3 hash of the symbol, so the same symbol always yields the same bars.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider};
use crate::domain::{Interval, Period, PriceBar, PriceSeries};

const NATIVE_INTERVALS: &[Interval] = &[Interval::OneHour, Interval::Daily, Interval::Weekly];

// Hourly session bars for non-crypto symbols, 14:00..=20:00 UTC.
const SESSION_HOURS: std::ops::RangeInclusive<u32> = 14..=20;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
    missing: HashSet<String>,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticProvider {
    /// Walks end on a fixed date so output does not depend on the wall clock.
    pub fn new() -> Self {
        Self {
            end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            missing: HashSet::new(),
        }
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = end;
        self
    }

    /// Symbols that should fail with `SymbolNotFound`.
    pub fn with_missing<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing.extend(symbols.into_iter().map(Into::into));
        self
    }

    fn timestamps(&self, symbol: &str, period: Period, interval: Interval) -> Vec<NaiveDateTime> {
        let trades_weekends = symbol.ends_with("-USD");
        let start = self.end - chrono::Duration::days(period.approx_days());

        let mut out = Vec::new();
        let mut day = start;
        while day <= self.end {
            let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            match interval {
                Interval::Weekly => {
                    if day.weekday() == Weekday::Mon {
                        out.extend(day.and_hms_opt(0, 0, 0));
                    }
                }
                Interval::Daily => {
                    if trades_weekends || !weekend {
                        out.extend(day.and_hms_opt(0, 0, 0));
                    }
                }
                Interval::OneHour | Interval::FourHour => {
                    if trades_weekends {
                        out.extend((0..24).filter_map(|h| day.and_hms_opt(h, 0, 0)));
                    } else if !weekend {
                        out.extend(SESSION_HOURS.filter_map(|h| day.and_hms_opt(h, 0, 0)));
                    }
                }
            }
            day += chrono::Duration::days(1);
        }
        out
    }

    /// Deterministic random walk for `symbol`.
    pub fn generate(&self, symbol: &str, period: Period, interval: Interval) -> Vec<PriceBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        // Wider steps for coarser bars.
        let step = match interval {
            Interval::OneHour => 0.008,
            Interval::FourHour => 0.015,
            Interval::Daily => 0.03,
            Interval::Weekly => 0.06,
        };

        let mut price = rng.gen_range(20.0..300.0_f64);
        self.timestamps(symbol, period, interval)
            .into_iter()
            .map(|timestamp| {
                let ret: f64 = rng.gen_range(-step..step);
                let open = price;
                let close = (price * (1.0 + ret)).max(0.01);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = rng.gen_range(500_000..5_000_000u64) as f64;
                price = close;
                PriceBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume,
                }
            })
            .collect()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, DataError> {
        if self.missing.contains(symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !NATIVE_INTERVALS.contains(&interval) {
            return Err(DataError::UnsupportedInterval {
                provider: self.name().to_string(),
                interval,
            });
        }
        let bars = self.generate(symbol, period, interval);
        PriceSeries::new(symbol, interval, bars)
            .map_err(|e| DataError::ValidationError(e.to_string()))
    }

    fn native_intervals(&self) -> &[Interval] {
        NATIVE_INTERVALS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch_series;

    #[test]
    fn same_symbol_same_bars() {
        let p = SyntheticProvider::new();
        let a = p.fetch("SPY", Period::OneYear, Interval::Daily).unwrap();
        let b = p.fetch("SPY", Period::OneYear, Interval::Daily).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_differ() {
        let p = SyntheticProvider::new();
        let a = p.fetch("SPY", Period::OneYear, Interval::Daily).unwrap();
        let b = p.fetch("QQQ", Period::OneYear, Interval::Daily).unwrap();
        assert_ne!(a.closes(), b.closes());
    }

    #[test]
    fn equities_skip_weekends() {
        let p = SyntheticProvider::new();
        let s = p.fetch("AAPL", Period::OneMonth, Interval::Daily).unwrap();
        assert!(s
            .bars()
            .iter()
            .all(|b| !matches!(b.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(s.len() > 15 && s.len() < 25);
    }

    #[test]
    fn crypto_trades_every_day() {
        let p = SyntheticProvider::new();
        let s = p.fetch("BTC-USD", Period::OneMonth, Interval::Daily).unwrap();
        assert_eq!(s.len(), 31);
    }

    #[test]
    fn weekly_bars_on_mondays() {
        let p = SyntheticProvider::new();
        let s = p.fetch("SPY", Period::OneYear, Interval::Weekly).unwrap();
        assert!(s.bars().iter().all(|b| b.timestamp.weekday() == Weekday::Mon));
        assert!(s.len() >= 52);
    }

    #[test]
    fn four_hour_through_fetch_series() {
        let p = SyntheticProvider::new();
        let s = fetch_series(&p, "ETH-USD", Period::OneMonth, Interval::FourHour).unwrap();
        assert_eq!(s.interval(), Interval::FourHour);
        assert_eq!(s.len(), 31 * 6);
    }

    #[test]
    fn missing_symbol_fails() {
        let p = SyntheticProvider::new().with_missing(["DELISTED"]);
        let err = p.fetch("DELISTED", Period::OneYear, Interval::Daily).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }
}
