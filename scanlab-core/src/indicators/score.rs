//! Composite bullish score — one point per condition that holds on the bar.
//!
//! score[t] = [fast > slow] + [close > fast] + [rsi_low <= rsi < rsi_high]
//!
//! The backtest samples bars whose score clears a threshold, so the score has to
//! be computable at every historical bar with no look-ahead.

use crate::error::CoreError;

pub fn composite_score(
    closes: &[f64],
    ema_fast: &[f64],
    ema_slow: &[f64],
    rsi: &[f64],
    rsi_band: (f64, f64),
) -> Result<Vec<f64>, CoreError> {
    let n = closes.len();
    if ema_fast.len() != n || ema_slow.len() != n || rsi.len() != n {
        return Err(CoreError::invalid(format!(
            "composite score inputs must be aligned: close={n}, fast={}, slow={}, rsi={}",
            ema_fast.len(),
            ema_slow.len(),
            rsi.len()
        )));
    }

    let (low, high) = rsi_band;
    Ok((0..n)
        .map(|i| {
            let trend = u8::from(ema_fast[i] > ema_slow[i]);
            let above = u8::from(closes[i] > ema_fast[i]);
            let momentum = u8::from(rsi[i] >= low && rsi[i] < high);
            f64::from(trend + above + momentum)
        })
        .collect())
}
