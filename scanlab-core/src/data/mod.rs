//! Market data: provider seam, concrete providers, resampling and ticker universes.

pub mod circuit_breaker;
pub mod provider;
pub mod resample;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use provider::{fetch_series, DataError, DataProvider};
pub use resample::{resample, resample_bars};
pub use synthetic::SyntheticProvider;
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
