//! Signal detection — flags candidate bars from fast/slow EMA relationships.
//!
//! Rules are stateless and see only close prices and the two EMA columns.
//! The detector runs every rule over the same input and folds the hits into a
//! single composite event per ticker per pass.

pub mod detector;
pub mod rules;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use detector::SignalDetector;
pub use rules::{BullishContinuation, GoldenCross, NearCross};

/// The rule family that triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    GoldenCross,
    BullishContinuation,
    NearCross,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::GoldenCross => "golden_cross",
            SignalKind::BullishContinuation => "bullish_continuation",
            SignalKind::NearCross => "near_cross",
        }
    }
}

/// Tunables for the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalParams {
    /// Trailing bars examined for a golden cross (>= 2).
    pub lookback_window: usize,
    /// Maximum fast/slow gap, in percent of the slow EMA, for a near-cross.
    pub near_cross_threshold_pct: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            lookback_window: 5,
            near_cross_threshold_pct: 3.0,
        }
    }
}

/// Aligned views handed to each rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub closes: &'a [f64],
    pub ema_fast: &'a [f64],
    pub ema_slow: &'a [f64],
}

impl RuleInput<'_> {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Index of the most recent bar. Callers guarantee a non-empty input.
    pub fn last_index(&self) -> usize {
        self.closes.len() - 1
    }
}

/// A single rule firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleHit {
    pub kind: SignalKind,
    /// Bar the rule fired on.
    pub bar_index: usize,
    /// Rule-specific payload (near-cross gap percentage).
    pub value: Option<f64>,
}

/// Trait for signal rules.
pub trait SignalRule: Send + Sync {
    /// Human-readable name (e.g., "golden_cross").
    fn name(&self) -> &str;

    /// Evaluate the rule over the whole input. Only data up to the last bar is visible.
    fn evaluate(&self, input: &RuleInput<'_>) -> Option<RuleHit>;
}

/// Composite event: every rule that fired for one ticker in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    /// Index of the latest bar (the bar the scan was evaluated at).
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub kinds: Vec<SignalKind>,
    /// Bar where the golden cross happened, when one did.
    pub cross_index: Option<usize>,
    pub cross_timestamp: Option<NaiveDateTime>,
    /// Fast/slow gap in percent, carried by near-cross.
    pub gap_pct: Option<f64>,
}

impl SignalEvent {
    pub fn has(&self, kind: SignalKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Kinds joined with `+`, for display.
    pub fn label(&self) -> String {
        self.kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}
