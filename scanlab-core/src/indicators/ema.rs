//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1)
//! Seed: EMA[0] = x[0].

use super::check_input;
use crate::error::CoreError;

/// Smoothing factor for a span.
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA over a full series.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>, CoreError> {
    if span == 0 {
        return Err(CoreError::invalid("EMA span must be >= 1"));
    }
    check_input("EMA", values)?;
    Ok(smooth(values, smoothing_factor(span)))
}

/// Exponential smoothing seeded with the first value. Caller guarantees non-empty input.
pub(crate) fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Incremental EMA with the same seed and recurrence as [`ema`].
#[derive(Debug, Clone, Copy)]
pub struct EmaState {
    alpha: f64,
    value: Option<f64>,
}

impl EmaState {
    pub fn new(span: usize) -> Result<Self, CoreError> {
        if span == 0 {
            return Err(CoreError::invalid("EMA span must be >= 1"));
        }
        Ok(Self {
            alpha: smoothing_factor(span),
            value: None,
        })
    }

    /// Feed the next value and return the updated average.
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
