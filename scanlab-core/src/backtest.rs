//! Forward-return backtest — how did past bars with a similar score play out?
//!
//! Every bar whose composite score clears the threshold is treated as a
//! hypothetical entry held for `horizon_steps` bars. The statistics are a
//! historical-frequency estimate only, recomputed from scratch on every scan.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Profit factor reported when there are gains but no losing samples.
pub const NO_LOSS_PROFIT_FACTOR: f64 = 9.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestParams {
    /// Bars between entry and exit.
    pub horizon_steps: usize,
    /// Minimum composite score for a bar to count as an entry.
    pub score_threshold: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            horizon_steps: 7,
            score_threshold: 2.0,
        }
    }
}

/// Per-symbol backtest statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    /// Fraction of samples with a strictly positive forward return, in [0, 1].
    pub win_rate: f64,
    /// Sum of positive returns over |sum of non-positive returns|.
    pub profit_factor: f64,
    pub sample_count: usize,
}

impl BacktestResult {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            win_rate: 0.0,
            profit_factor: 0.0,
            sample_count: 0,
        }
    }
}

/// Run the forward-return backtest for one symbol.
pub fn forward_return_backtest(
    symbol: &str,
    closes: &[f64],
    scores: &[f64],
    params: &BacktestParams,
) -> Result<BacktestResult, CoreError> {
    let returns = forward_returns(closes, scores, params)?;
    Ok(BacktestResult {
        symbol: symbol.to_string(),
        win_rate: win_rate(&returns),
        profit_factor: profit_factor(&returns),
        sample_count: returns.len(),
    })
}

/// Forward returns close[i+steps]/close[i] - 1 for every qualifying index i.
///
/// An index qualifies when i + steps < len and score[i] >= threshold.
pub fn forward_returns(
    closes: &[f64],
    scores: &[f64],
    params: &BacktestParams,
) -> Result<Vec<f64>, CoreError> {
    if closes.len() != scores.len() {
        return Err(CoreError::invalid(format!(
            "close ({}) and score ({}) series must be aligned",
            closes.len(),
            scores.len()
        )));
    }
    if params.horizon_steps == 0 {
        return Err(CoreError::invalid("backtest horizon must be >= 1 step"));
    }

    let steps = params.horizon_steps;
    let usable = closes.len().saturating_sub(steps);
    Ok((0..usable)
        .filter(|&i| scores[i] >= params.score_threshold)
        .map(|i| closes[i + steps] / closes[i] - 1.0)
        .collect())
}

// ─── Individual statistic functions ─────────────────────────────────

/// Fraction of returns strictly above zero. 0.0 for no samples.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let winners = returns.iter().filter(|&&r| r > 0.0).count();
    winners as f64 / returns.len() as f64
}

/// Gross gains over gross non-positive returns.
///
/// Zero returns count on the losing side. With no loss mass the result is
/// [`NO_LOSS_PROFIT_FACTOR`] when there are gains and 0.0 otherwise.
pub fn profit_factor(returns: &[f64]) -> f64 {
    let gains: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|&&r| r <= 0.0).sum::<f64>().abs();

    if losses == 0.0 {
        return if gains > 0.0 {
            NO_LOSS_PROFIT_FACTOR
        } else {
            0.0
        };
    }
    gains / losses
}
