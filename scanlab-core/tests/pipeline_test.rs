//! End-to-end checks of the per-symbol pipeline over fixture and synthetic data.

use scanlab_core::data::{fetch_series, DataProvider, SyntheticProvider, Universe};
use scanlab_core::domain::{Interval, Period};
use scanlab_core::evaluate::{evaluate_series, EvaluationParams, Evaluator};
use scanlab_core::indicators::{IndicatorParams, IndicatorSeries};
use scanlab_core::signals::SignalKind;
use scanlab_core::CoreError;

mod common;

#[test]
fn rally_triggers_cross_and_continuation() {
    let closes = common::dip_then_rally();
    let report = evaluate_series(&common::series(&closes), &EvaluationParams::default()).unwrap();

    let signal = report.signal.expect("rally should trigger");
    assert!(signal.has(SignalKind::GoldenCross));
    assert!(signal.has(SignalKind::BullishContinuation));
    assert_eq!(signal.bar_index, closes.len() - 1);
    let cross = signal.cross_index.unwrap();
    assert!(cross >= closes.len() - 5 && cross < closes.len());
}

#[test]
fn steady_decline_has_no_signal() {
    let closes: Vec<f64> = (0..60).map(|i| 200.0 - 2.0 * i as f64).collect();
    let report = evaluate_series(&common::series(&closes), &EvaluationParams::default()).unwrap();
    assert!(report.signal.is_none());
    // Falling prices never score 2+ on the trend conditions alone.
    assert_eq!(report.backtest.win_rate, 0.0);
}

#[test]
fn indicator_columns_align_with_synthetic_bars() {
    let provider = SyntheticProvider::new();
    let series = provider
        .fetch("MSFT", Period::OneYear, Interval::Daily)
        .unwrap();
    let ind = IndicatorSeries::compute(&series, &IndicatorParams::default()).unwrap();
    assert_eq!(ind.len(), series.len());
    assert_eq!(ind.score.len(), series.len());
    assert!(ind.score.iter().all(|s| (0.0..=3.0).contains(s)));
}

#[test]
fn whole_default_universe_evaluates_offline() {
    let provider = SyntheticProvider::new();
    let evaluator = Evaluator::new(EvaluationParams::default()).unwrap();
    for symbol in Universe::default_us().symbols() {
        let series = fetch_series(&provider, symbol, Period::TwoYears, Interval::Daily).unwrap();
        let report = evaluator.evaluate(&series).unwrap();
        assert_eq!(&report.symbol, symbol);
        assert!(report.backtest.sample_count <= series.len());
    }
}

#[test]
fn four_hour_pipeline_runs_on_resampled_bars() {
    let provider = SyntheticProvider::new();
    let series =
        fetch_series(&provider, "BTC-USD", Period::ThreeMonths, Interval::FourHour).unwrap();
    assert_eq!(series.interval(), Interval::FourHour);
    let report = evaluate_series(&series, &EvaluationParams::default()).unwrap();
    assert_eq!(report.symbol, "BTC-USD");
}

#[test]
fn single_bar_series_is_insufficient() {
    let err = evaluate_series(&common::series(&[42.0]), &EvaluationParams::default()).unwrap_err();
    assert!(matches!(err, CoreError::InsufficientData { required: 2, actual: 1 }));
}
