//! The three scan rules: golden cross, bullish continuation, near-cross.

use super::{RuleHit, RuleInput, SignalKind, SignalRule};

/// Fast EMA crossing above the slow EMA inside the trailing window.
///
/// Every window bar is paired with the bar before it, which may sit just
/// outside the window. Pairs are scanned oldest first and the earliest cross
/// wins: prev.fast <= prev.slow AND curr.fast > curr.slow.
#[derive(Debug, Clone)]
pub struct GoldenCross {
    pub lookback: usize,
}

impl GoldenCross {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 2, "golden cross lookback must be >= 2");
        Self { lookback }
    }
}

impl SignalRule for GoldenCross {
    fn name(&self) -> &str {
        "golden_cross"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Option<RuleHit> {
        let n = input.len();
        if n < 2 {
            return None;
        }
        let start = n.saturating_sub(self.lookback);
        let (fast, slow) = (input.ema_fast, input.ema_slow);

        (start.max(1)..n)
            .find(|&i| fast[i - 1] <= slow[i - 1] && fast[i] > slow[i])
            .map(|i| RuleHit {
                kind: SignalKind::GoldenCross,
                bar_index: i,
                value: None,
            })
    }
}

/// Trend already up: fast > slow and the latest close sits above the fast EMA.
#[derive(Debug, Clone, Default)]
pub struct BullishContinuation;

impl SignalRule for BullishContinuation {
    fn name(&self) -> &str {
        "bullish_continuation"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Option<RuleHit> {
        if input.is_empty() {
            return None;
        }
        let i = input.last_index();
        let fast = input.ema_fast[i];
        (fast > input.ema_slow[i] && input.closes[i] > fast).then_some(RuleHit {
            kind: SignalKind::BullishContinuation,
            bar_index: i,
            value: None,
        })
    }
}

/// Fast EMA below but closing in on the slow EMA while still rising.
///
/// Fires when gap_pct = (slow - fast) / slow * 100 is under the threshold and the
/// mean of the last three fast-EMA deltas is positive.
#[derive(Debug, Clone)]
pub struct NearCross {
    pub threshold_pct: f64,
}

/// Number of fast-EMA deltas averaged for the slope check.
const SLOPE_DELTAS: usize = 3;

impl NearCross {
    pub fn new(threshold_pct: f64) -> Self {
        assert!(threshold_pct > 0.0, "near-cross threshold must be > 0");
        Self { threshold_pct }
    }

    /// Mean of the last (up to) three fast-EMA deltas. None with fewer than two bars.
    fn fast_slope(fast: &[f64]) -> Option<f64> {
        let n = fast.len();
        if n < 2 {
            return None;
        }
        let count = SLOPE_DELTAS.min(n - 1);
        let sum: f64 = ((n - count)..n).map(|i| fast[i] - fast[i - 1]).sum();
        Some(sum / count as f64)
    }
}

impl SignalRule for NearCross {
    fn name(&self) -> &str {
        "near_cross"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Option<RuleHit> {
        if input.is_empty() {
            return None;
        }
        let i = input.last_index();
        let (fast, slow) = (input.ema_fast[i], input.ema_slow[i]);
        if fast >= slow {
            return None;
        }

        let gap_pct = (slow - fast) / slow * 100.0;
        let rising = Self::fast_slope(input.ema_fast).is_some_and(|s| s > 0.0);

        (gap_pct < self.threshold_pct && rising).then_some(RuleHit {
            kind: SignalKind::NearCross,
            bar_index: i,
            value: Some(gap_pct),
        })
    }
}
