//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, synthetic
//! random walks, test fixtures) so the scanner can swap implementations and mock
//! them in tests. Providers only return what they support natively; building
//! coarser intraday bars is done here, in [`fetch_series`].

use thiserror::Error;
use tracing::debug;

use super::resample::resample;
use crate::domain::{Interval, Period, PriceSeries};

/// Structured error types for data retrieval.
///
/// Every variant is recoverable from the scanner's point of view: the ticker is
/// counted as failed and the pass moves on.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("{provider} cannot supply {interval} bars")]
    UnsupportedInterval { provider: String, interval: Interval },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market data providers.
///
/// Implementations handle the specifics of fetching from one source and return
/// a validated [`PriceSeries`].
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering `period` at `interval`.
    fn fetch(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, DataError>;

    /// Intervals this provider can serve directly.
    fn native_intervals(&self) -> &[Interval];

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Fetch a series, resampling from a finer native interval when needed.
pub fn fetch_series(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<PriceSeries, DataError> {
    let native = provider.native_intervals();
    if native.contains(&interval) {
        return provider.fetch(symbol, period, interval);
    }

    let source = interval
        .resample_source()
        .filter(|src| native.contains(src))
        .ok_or_else(|| DataError::UnsupportedInterval {
            provider: provider.name().to_string(),
            interval,
        })?;

    debug!(symbol, from = %source, to = %interval, "resampling");
    let fine = provider.fetch(symbol, period, source)?;
    resample(&fine, interval).map_err(|e| DataError::ValidationError(e.to_string()))
}
