//! Relative Strength Index (RSI).
//!
//! delta[0] = 0, delta[t] = x[t] - x[t-1]; gains and losses are smoothed
//! exponentially with alpha = 1 / period, seeded at index 0.
//! RSI = 100 - 100 / (1 + avg_gain / (avg_loss + RSI_EPSILON)).
//! A flat start therefore reads 0, and a run of pure gains approaches 100.

use super::check_input;
use super::ema::smooth;
use crate::error::CoreError;

/// Guard added to the average loss so a loss-free window does not divide by zero.
pub const RSI_EPSILON: f64 = 1e-9;

pub fn rsi(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    if period == 0 {
        return Err(CoreError::invalid("RSI period must be >= 1"));
    }
    check_input("RSI", values)?;

    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let delta = if i == 0 { 0.0 } else { values[i] - values[i - 1] };
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = smooth(&gains, alpha);
    let avg_loss = smooth(&losses, alpha);

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| 100.0 - 100.0 / (1.0 + g / (l + RSI_EPSILON)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains_approaches_100() {
        let result = rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3).unwrap();
        for &v in &result[1..] {
            assert!(v > 99.99 && v <= 100.0, "expected ~100, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let result = rsi(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0], 3).unwrap();
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rsi_first_value_is_zero() {
        // delta[0] = 0 → no gain, no loss → 100 - 100/1 = 0
        let result = rsi(&[50.0, 60.0], 14).unwrap();
        assert_eq!(result[0], 0.0);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Closes: 44, 44.34, 44.09; deltas 0, +0.34, -0.25; alpha = 1/3
        // avg_gain: 0, 0.11333, 0.07556; avg_loss: 0, 0, 0.08333
        // RSI[2] = 100 - 100/(1 + 0.07556/0.08333) = 47.5524...
        let result = rsi(&[44.0, 44.34, 44.09], 3).unwrap();
        assert_approx(result[2], 47.552_447, 1e-4);
    }

    #[test]
    fn rsi_bounds() {
        let result = rsi(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0], 3).unwrap();
        for (i, &v) in result.iter().enumerate() {
            assert!(
                (0.0..=100.0).contains(&v),
                "RSI out of bounds at bar {i}: {v}"
            );
        }
    }

    #[test]
    fn rsi_length_matches_input() {
        assert_eq!(rsi(&[1.0, 2.0, 3.0, 2.0], 14).unwrap().len(), 4);
    }

    #[test]
    fn rsi_rejects_bad_input() {
        assert!(rsi(&[], 14).is_err());
        assert!(rsi(&[1.0, 2.0], 0).is_err());
    }
}
