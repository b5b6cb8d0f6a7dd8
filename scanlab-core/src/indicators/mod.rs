//! Indicator engine.
//!
//! Every indicator here returns a vector index-aligned 1:1 with its input and
//! seeded at index 0, so there is no warmup gap and no NaN padding. Value `i`
//! depends only on inputs `0..=i`.

pub mod ema;
pub mod rsi;
pub mod score;
pub mod series;

pub use ema::{ema, EmaState};
pub use rsi::{rsi, RSI_EPSILON};
pub use score::composite_score;
pub use series::{IndicatorParams, IndicatorSeries};

/// Reject empty or non-finite input with a message naming the indicator.
pub(crate) fn check_input(name: &str, values: &[f64]) -> Result<(), crate::CoreError> {
    if values.is_empty() {
        return Err(crate::CoreError::invalid(format!("{name} of an empty series")));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(crate::CoreError::invalid(format!(
            "{name}: non-finite value at index {i}"
        )));
    }
    Ok(())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
