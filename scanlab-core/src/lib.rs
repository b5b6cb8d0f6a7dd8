//! ScanLab Core — price series, indicators, signal rules, forward-return backtest.
//!
//! This crate contains the computational heart of the scanner:
//! - Domain types (price bars, validated price series, intervals, periods)
//! - Indicator engine (EMA, RSI, composite score), all index-aligned with the input
//! - Signal detector (golden cross, bullish continuation, near-cross)
//! - Forward-return backtest (win rate, profit factor)
//! - Per-symbol evaluation pipeline tying the three together
//! - Data layer: provider trait, Yahoo and synthetic providers, resampling, universes
//!
//! Nothing here blocks except the data providers, and nothing here owns scan state.

pub mod backtest;
pub mod data;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod indicators;
pub mod signals;

pub use error::CoreError;
