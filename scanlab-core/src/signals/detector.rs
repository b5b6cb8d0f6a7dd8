//! SignalDetector — runs every rule and folds the hits into one composite event.

use super::rules::{BullishContinuation, GoldenCross, NearCross};
use super::{RuleInput, SignalEvent, SignalKind, SignalParams, SignalRule};
use crate::domain::PriceSeries;
use crate::error::CoreError;

/// Minimum bars the detector accepts.
pub const MIN_SIGNAL_BARS: usize = 2;

pub struct SignalDetector {
    rules: Vec<Box<dyn SignalRule>>,
}

impl std::fmt::Debug for SignalDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("SignalDetector").field("rules", &names).finish()
    }
}

impl SignalDetector {
    /// Standard rule set: golden cross, bullish continuation, near-cross.
    pub fn new(params: &SignalParams) -> Result<Self, CoreError> {
        if params.lookback_window < 2 {
            return Err(CoreError::invalid("lookback_window must be >= 2"));
        }
        if params.near_cross_threshold_pct.is_nan() || params.near_cross_threshold_pct <= 0.0 {
            return Err(CoreError::invalid("near_cross_threshold_pct must be > 0"));
        }
        Ok(Self::with_rules(vec![
            Box::new(GoldenCross::new(params.lookback_window)),
            Box::new(BullishContinuation),
            Box::new(NearCross::new(params.near_cross_threshold_pct)),
        ]))
    }

    pub fn with_rules(rules: Vec<Box<dyn SignalRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate all rules at the latest bar of `series`.
    ///
    /// Returns `Ok(None)` when nothing fires. Fewer than two bars is
    /// `InsufficientData`; EMA columns not aligned with the series is `InvalidInput`.
    pub fn detect(
        &self,
        series: &PriceSeries,
        ema_fast: &[f64],
        ema_slow: &[f64],
    ) -> Result<Option<SignalEvent>, CoreError> {
        let n = series.len();
        if n < MIN_SIGNAL_BARS {
            return Err(CoreError::InsufficientData {
                required: MIN_SIGNAL_BARS,
                actual: n,
            });
        }
        if ema_fast.len() != n || ema_slow.len() != n {
            return Err(CoreError::invalid(format!(
                "{}: EMA columns ({}, {}) not aligned with {n} bars",
                series.symbol(),
                ema_fast.len(),
                ema_slow.len()
            )));
        }

        let closes = series.closes();
        let input = RuleInput {
            closes: &closes,
            ema_fast,
            ema_slow,
        };

        let hits: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(&input))
            .collect();
        if hits.is_empty() {
            return Ok(None);
        }

        let bars = series.bars();
        let last = n - 1;
        let cross_index = hits
            .iter()
            .find(|h| h.kind == SignalKind::GoldenCross)
            .map(|h| h.bar_index);
        let gap_pct = hits
            .iter()
            .find(|h| h.kind == SignalKind::NearCross)
            .and_then(|h| h.value);

        Ok(Some(SignalEvent {
            symbol: series.symbol().to_string(),
            bar_index: last,
            timestamp: bars[last].timestamp,
            kinds: hits.iter().map(|h| h.kind).collect(),
            cross_index,
            cross_timestamp: cross_index.map(|i| bars[i].timestamp),
            gap_pct,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::series_from_closes;

    fn detector() -> SignalDetector {
        SignalDetector::new(&SignalParams::default()).unwrap()
    }

    #[test]
    fn rejects_single_bar() {
        let series = series_from_closes(&[100.0]);
        let err = detector().detect(&series, &[100.0], &[100.0]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_misaligned_columns() {
        let series = series_from_closes(&[100.0, 101.0, 102.0]);
        let result = detector().detect(&series, &[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn rejects_bad_params() {
        let mut params = SignalParams::default();
        params.lookback_window = 1;
        assert!(SignalDetector::new(&params).is_err());
        let mut params = SignalParams::default();
        params.near_cross_threshold_pct = 0.0;
        assert!(SignalDetector::new(&params).is_err());
        params.near_cross_threshold_pct = f64::NAN;
        assert!(SignalDetector::new(&params).is_err());
    }

    #[test]
    fn no_trigger_is_none() {
        // Fast well below slow and falling: nothing fires.
        let series = series_from_closes(&[100.0, 99.0, 98.0, 97.0]);
        let fast = [90.0, 89.0, 88.0, 87.0];
        let slow = [100.0; 4];
        assert!(detector().detect(&series, &fast, &slow).unwrap().is_none());
    }

    #[test]
    fn cross_and_continuation_reported_together() {
        let series = series_from_closes(&[100.0, 100.0, 100.0, 100.0, 100.0, 112.0]);
        let fast = [95.0, 95.0, 95.0, 95.0, 95.0, 105.0];
        let slow = [100.0; 6];
        let event = detector().detect(&series, &fast, &slow).unwrap().unwrap();

        assert_eq!(event.symbol, "TEST");
        assert_eq!(event.bar_index, 5);
        assert!(event.has(SignalKind::GoldenCross));
        assert!(event.has(SignalKind::BullishContinuation));
        assert!(!event.has(SignalKind::NearCross));
        assert_eq!(event.cross_index, Some(5));
        assert_eq!(event.cross_timestamp, Some(series.bars()[5].timestamp));
        assert_eq!(event.label(), "golden_cross+bullish_continuation");
        assert!(event.gap_pct.is_none());
    }

    #[test]
    fn near_cross_event_carries_gap() {
        let series = series_from_closes(&[97.0, 97.5, 98.0, 98.5]);
        let fast = [97.0, 97.5, 98.0, 98.5];
        let slow = [100.0; 4];
        let event = detector().detect(&series, &fast, &slow).unwrap().unwrap();
        assert_eq!(event.kinds, vec![SignalKind::NearCross]);
        assert!((event.gap_pct.unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn debug_lists_rule_names() {
        let d = detector();
        assert_eq!(
            d.rule_names(),
            vec!["golden_cross", "bullish_continuation", "near_cross"]
        );
        assert!(format!("{d:?}").contains("near_cross"));
    }
}
