//! Per-symbol pipeline: indicators → signal detection → forward-return backtest.

use serde::{Deserialize, Serialize};

use crate::backtest::{forward_return_backtest, BacktestParams, BacktestResult};
use crate::domain::PriceSeries;
use crate::error::CoreError;
use crate::indicators::{IndicatorParams, IndicatorSeries};
use crate::signals::{SignalDetector, SignalEvent, SignalParams};

/// Everything the pipeline needs, grouped by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationParams {
    pub indicators: IndicatorParams,
    pub signals: SignalParams,
    pub backtest: BacktestParams,
}

/// Latest-bar snapshot of the derived columns, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestValues {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub score: f64,
}

/// Outcome of evaluating one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub signal: Option<SignalEvent>,
    pub backtest: BacktestResult,
    pub latest: LatestValues,
}

/// Reusable evaluator: builds the detector once, then evaluates many series.
#[derive(Debug)]
pub struct Evaluator {
    params: EvaluationParams,
    detector: SignalDetector,
}

impl Evaluator {
    pub fn new(params: EvaluationParams) -> Result<Self, CoreError> {
        let detector = SignalDetector::new(&params.signals)?;
        Ok(Self { params, detector })
    }

    pub fn params(&self) -> &EvaluationParams {
        &self.params
    }

    pub fn evaluate(&self, series: &PriceSeries) -> Result<SymbolReport, CoreError> {
        let indicators = IndicatorSeries::compute(series, &self.params.indicators)?;
        let signal = self
            .detector
            .detect(series, &indicators.ema_fast, &indicators.ema_slow)?;

        let closes = series.closes();
        let backtest = forward_return_backtest(
            series.symbol(),
            &closes,
            &indicators.score,
            &self.params.backtest,
        )?;

        // detect() has already rejected series shorter than two bars.
        let last = indicators.len() - 1;
        let latest = LatestValues {
            close: closes[last],
            ema_fast: indicators.ema_fast[last],
            ema_slow: indicators.ema_slow[last],
            rsi: indicators.rsi[last],
            score: indicators.score[last],
        };

        Ok(SymbolReport {
            symbol: series.symbol().to_string(),
            signal,
            backtest,
            latest,
        })
    }
}

/// One-shot convenience wrapper around [`Evaluator`].
pub fn evaluate_series(
    series: &PriceSeries,
    params: &EvaluationParams,
) -> Result<SymbolReport, CoreError> {
    Evaluator::new(params.clone())?.evaluate(series)
}
