//! Scan state — the one value that survives between passes.
//!
//! `ScanState` is plain data: the scanner mutates it one ticker at a time and a
//! [`ScanStore`](crate::store::ScanStore) persists it whole. Nothing else about a
//! scan needs to be remembered to resume it.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use scanlab_core::data::Universe;
use scanlab_core::evaluate::SymbolReport;
use scanlab_core::signals::{SignalEvent, SignalKind};

use crate::config::FilterConfig;

/// One qualifying ticker, as shown in the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub ticker: String,
    pub signals: Vec<SignalKind>,
    /// Latest bar the signal was evaluated at.
    pub signal_time: NaiveDateTime,
    pub cross_time: Option<NaiveDateTime>,
    pub gap_pct: Option<f64>,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub sample_count: usize,
}

impl ScanHit {
    fn from_parts(report: &SymbolReport, signal: &SignalEvent) -> Self {
        Self {
            ticker: report.symbol.clone(),
            signals: signal.kinds.clone(),
            signal_time: signal.timestamp,
            cross_time: signal.cross_timestamp,
            gap_pct: signal.gap_pct,
            close: report.latest.close,
            ema_fast: report.latest.ema_fast,
            ema_slow: report.latest.ema_slow,
            rsi: report.latest.rsi,
            win_rate: report.backtest.win_rate,
            profit_factor: report.backtest.profit_factor,
            sample_count: report.backtest.sample_count,
        }
    }

    /// A hit when a signal fired and the backtest clears every threshold.
    pub fn qualify(report: &SymbolReport, filter: &FilterConfig) -> Option<Self> {
        let signal = report.signal.as_ref()?;
        let bt = &report.backtest;
        let passes = bt.win_rate >= filter.min_win_rate
            && bt.profit_factor >= filter.min_profit_factor
            && bt.sample_count >= filter.min_samples;
        passes.then(|| Self::from_parts(report, signal))
    }

    /// Signal kinds joined with `+`.
    pub fn signal_label(&self) -> String {
        self.signals
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Progress of a scan across passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    /// Qualifying tickers, in discovery order.
    pub high_prob: Vec<ScanHit>,
    /// Every ticker already attempted in this scan, successful or not.
    pub scanned_symbols: BTreeSet<String>,
    /// Tickers whose fetch or computation failed.
    pub failed_count: usize,
    /// Set once the scanned set covers the universe.
    pub fully_scanned: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_scanned(&self, symbol: &str) -> bool {
        self.scanned_symbols.contains(symbol)
    }

    /// Universe symbols not yet attempted, in universe order.
    pub fn remaining<'u>(&self, universe: &'u Universe) -> Vec<&'u str> {
        universe
            .symbols()
            .iter()
            .map(String::as_str)
            .filter(|s| !self.is_scanned(s))
            .collect()
    }

    /// Phase at rest. `Scanning` only exists while a batch is in flight.
    pub fn phase(&self) -> ScanPhase {
        if self.fully_scanned {
            if self.failed_count > 0 {
                ScanPhase::FailedPartial
            } else {
                ScanPhase::Completed
            }
        } else if self.scanned_symbols.is_empty() {
            ScanPhase::Idle
        } else {
            ScanPhase::Paused
        }
    }

    pub fn summary(&self, universe: &Universe) -> ScanSummary {
        let scanned = universe
            .symbols()
            .iter()
            .filter(|s| self.is_scanned(s))
            .count();
        ScanSummary {
            phase: self.phase(),
            universe_size: universe.len(),
            scanned,
            remaining: universe.len() - scanned,
            qualified: self.high_prob.len(),
            failed: self.failed_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Scanning,
    Paused,
    Completed,
    /// Completed, but some tickers could not be evaluated.
    FailedPartial,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Scanning => "scanning",
            ScanPhase::Paused => "paused",
            ScanPhase::Completed => "completed",
            ScanPhase::FailedPartial => "failed_partial",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Completed | ScanPhase::FailedPartial)
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounting snapshot against a universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub phase: ScanPhase,
    pub universe_size: usize,
    pub scanned: usize,
    pub remaining: usize,
    pub qualified: usize,
    pub failed: usize,
}


#[cfg(test)]
mod tests {
    use super::fixtures::hit;
    use super::*;
    use scanlab_core::backtest::BacktestResult;
    use scanlab_core::evaluate::LatestValues;

    fn report(signal: bool, win_rate: f64, pf: f64, samples: usize) -> SymbolReport {
        let ts = NaiveDateTime::default();
        SymbolReport {
            symbol: "AAPL".into(),
            signal: signal.then(|| SignalEvent {
                symbol: "AAPL".into(),
                bar_index: 10,
                timestamp: ts,
                kinds: vec![SignalKind::NearCross],
                cross_index: None,
                cross_timestamp: None,
                gap_pct: Some(1.2),
            }),
            backtest: BacktestResult {
                symbol: "AAPL".into(),
                win_rate,
                profit_factor: pf,
                sample_count: samples,
            },
            latest: LatestValues {
                close: 100.0,
                ema_fast: 99.0,
                ema_slow: 100.5,
                rsi: 55.0,
                score: 1.0,
            },
        }
    }

    #[test]
    fn qualification_requires_signal_and_thresholds() {
        let filter = FilterConfig::default();
        assert!(ScanHit::qualify(&report(true, 0.6, 2.0, 5), &filter).is_some());
        assert!(ScanHit::qualify(&report(false, 0.9, 9.9, 50), &filter).is_none());
        assert!(ScanHit::qualify(&report(true, 0.5, 2.0, 5), &filter).is_none());
        assert!(ScanHit::qualify(&report(true, 0.6, 1.4, 5), &filter).is_none());
        assert!(ScanHit::qualify(&report(true, 0.6, 2.0, 0), &filter).is_none());
    }

    #[test]
    fn qualified_hit_carries_signal_payload() {
        let hit = ScanHit::qualify(&report(true, 0.6, 2.0, 5), &FilterConfig::default()).unwrap();
        assert_eq!(hit.ticker, "AAPL");
        assert_eq!(hit.gap_pct, Some(1.2));
        assert_eq!(hit.signal_label(), "near_cross");
        assert_eq!(hit.sample_count, 5);
    }

    #[test]
    fn phase_follows_state() {
        let mut state = ScanState::new();
        assert_eq!(state.phase(), ScanPhase::Idle);
        state.scanned_symbols.insert("AAPL".into());
        assert_eq!(state.phase(), ScanPhase::Paused);
        state.fully_scanned = true;
        assert_eq!(state.phase(), ScanPhase::Completed);
        state.failed_count = 1;
        assert_eq!(state.phase(), ScanPhase::FailedPartial);
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn summary_counts_against_universe() {
        let universe = Universe::new(["AAPL", "MSFT", "NVDA"]).unwrap();
        let mut state = ScanState::new();
        state.scanned_symbols.insert("MSFT".into());
        state.scanned_symbols.insert("DELISTED".into());
        state.high_prob.push(hit("MSFT"));

        let summary = state.summary(&universe);
        assert_eq!(summary.universe_size, 3);
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.remaining, 2);
        assert_eq!(summary.qualified, 1);
        assert_eq!(state.remaining(&universe), vec!["AAPL", "NVDA"]);
    }

    #[test]
    fn json_field_names() {
        let json = serde_json::to_value(ScanState::new()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["failed_count", "fully_scanned", "high_prob", "scanned_symbols"]
        );
    }
}
