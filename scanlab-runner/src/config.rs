//! Scan configuration, loaded from TOML.
//!
//! Every section is optional and falls back to its defaults, so an empty file
//! is a valid config. Unknown keys are rejected to catch typos early.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scanlab_core::backtest::BacktestParams;
use scanlab_core::domain::{Interval, Period};
use scanlab_core::evaluate::EvaluationParams;
use scanlab_core::indicators::IndicatorParams;
use scanlab_core::signals::SignalParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(String),

    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Qualification thresholds for the high-probability list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub min_win_rate: f64,
    pub min_profit_factor: f64,
    pub min_samples: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_win_rate: 0.55,
            min_profit_factor: 1.5,
            min_samples: 1,
        }
    }
}

/// Orchestration knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSettings {
    /// Tickers processed between checkpoints.
    pub checkpoint_batch_size: usize,
    /// Worker threads for the fetch step. 1 means sequential.
    pub fetch_concurrency: usize,
    /// Pause before every fetch, in milliseconds.
    pub request_delay_ms: u64,
    pub period: Period,
    pub interval: Interval,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            checkpoint_batch_size: 100,
            fetch_concurrency: 1,
            request_delay_ms: 0,
            period: Period::TwoYears,
            interval: Interval::Daily,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub indicators: IndicatorParams,
    pub signals: SignalParams,
    pub backtest: BacktestParams,
    pub filter: FilterConfig,
    pub scan: ScanSettings,
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn evaluation(&self) -> EvaluationParams {
        EvaluationParams {
            indicators: self.indicators.clone(),
            signals: self.signals.clone(),
            backtest: self.backtest.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.fast_span == 0 {
            return Err(invalid("indicators.fast_span", "must be >= 1"));
        }
        if ind.slow_span <= ind.fast_span {
            return Err(invalid(
                "indicators.slow_span",
                format!("must exceed fast_span ({})", ind.fast_span),
            ));
        }
        if ind.rsi_period == 0 {
            return Err(invalid("indicators.rsi_period", "must be >= 1"));
        }
        if !(0.0..=100.0).contains(&ind.rsi_band_low)
            || !(0.0..=100.0).contains(&ind.rsi_band_high)
            || ind.rsi_band_low >= ind.rsi_band_high
        {
            return Err(invalid(
                "indicators.rsi_band_low",
                format!(
                    "band [{}, {}) must be a non-empty range within 0..=100",
                    ind.rsi_band_low, ind.rsi_band_high
                ),
            ));
        }

        if self.signals.lookback_window < 2 {
            return Err(invalid("signals.lookback_window", "must be >= 2"));
        }
        let gap = self.signals.near_cross_threshold_pct;
        if gap.is_nan() || gap <= 0.0 {
            return Err(invalid("signals.near_cross_threshold_pct", "must be > 0"));
        }

        if self.backtest.horizon_steps == 0 {
            return Err(invalid("backtest.horizon_steps", "must be >= 1"));
        }
        if !self.backtest.score_threshold.is_finite() {
            return Err(invalid("backtest.score_threshold", "must be finite"));
        }

        if !(0.0..=1.0).contains(&self.filter.min_win_rate) {
            return Err(invalid("filter.min_win_rate", "must be within 0..=1"));
        }
        let min_pf = self.filter.min_profit_factor;
        if min_pf.is_nan() || min_pf < 0.0 {
            return Err(invalid("filter.min_profit_factor", "must be >= 0"));
        }

        if self.scan.checkpoint_batch_size == 0 {
            return Err(invalid("scan.checkpoint_batch_size", "must be >= 1"));
        }
        if self.scan.fetch_concurrency == 0 {
            return Err(invalid("scan.fetch_concurrency", "must be >= 1"));
        }
        Ok(())
    }
}
