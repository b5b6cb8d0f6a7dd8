//! IndicatorSeries — all derived columns for one price series, computed in one pass.

use serde::{Deserialize, Serialize};

use super::{composite_score, ema, rsi};
use crate::domain::PriceSeries;
use crate::error::CoreError;

/// Indicator windows and the RSI band used by the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub rsi_period: usize,
    pub rsi_band_low: f64,
    pub rsi_band_high: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_span: 9,
            slow_span: 21,
            rsi_period: 14,
            rsi_band_low: 50.0,
            rsi_band_high: 70.0,
        }
    }
}

/// Derived values, each vector index-aligned with the source series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<f64>,
    pub score: Vec<f64>,
}

impl IndicatorSeries {
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Result<Self, CoreError> {
        let closes = series.closes();
        let ema_fast = ema(&closes, params.fast_span)?;
        let ema_slow = ema(&closes, params.slow_span)?;
        let rsi = rsi(&closes, params.rsi_period)?;
        let score = composite_score(
            &closes,
            &ema_fast,
            &ema_slow,
            &rsi,
            (params.rsi_band_low, params.rsi_band_high),
        )?;

        Ok(Self {
            ema_fast,
            ema_slow,
            rsi,
            score,
        })
    }

    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }
}
