//! PriceBar and PriceSeries — the market data the whole pipeline runs on.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::interval::Interval;
use crate::error::CoreError;

/// OHLCV bar for a single symbol at a single timestamp.
///
/// Volume is a float so crypto pairs with fractional volume fit the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Returns true if any OHLCV field is not finite (void bar).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Prices strictly positive, volume non-negative, nothing void.
    pub fn is_valid(&self) -> bool {
        !self.is_void()
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Ordered bars for one symbol on one interval.
///
/// Construction validates the invariants (strictly increasing timestamps, valid bars),
/// after which the series is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    interval: Interval,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        bars: Vec<PriceBar>,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_valid() {
                return Err(CoreError::invalid(format!(
                    "{symbol}: bar {i} at {} has non-positive or non-finite values",
                    bar.timestamp
                )));
            }
        }

        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::invalid(format!(
                "{symbol}: timestamps not strictly increasing at bar {}",
                i + 1
            )));
        }

        Ok(Self {
            symbol,
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close prices, index-aligned with the bars.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}

/// Build a daily series from close prices for tests.
///
/// open = previous close, high/low = max/min(open, close) +/- 1% , volume = 1000.
#[cfg(test)]
pub(crate) fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::new("TEST", Interval::Daily, bars).unwrap()
}
