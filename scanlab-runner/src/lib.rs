//! ScanLab Runner — checkpointed universe scans on top of `scanlab-core`.
//!
//! This crate provides:
//! - `ScanConfig` loaded from TOML, with validation
//! - `ScanState`, the resumable record of a scan, and its phase/summary views
//! - `ScanStore` persistence (JSON file, in-memory)
//! - `Scanner`, the batch orchestrator with cancellation and optional fetch pool
//! - `RequestPacer`, which spaces fetch starts across pool workers
//! - Progress hooks and CSV/JSON/table export

pub mod config;
pub mod export;
pub mod pacing;
pub mod progress;
pub mod scanner;
pub mod state;
pub mod store;

pub use config::{ConfigError, FilterConfig, ScanConfig, ScanSettings};
pub use pacing::RequestPacer;
pub use progress::{NoProgress, ScanProgress, StdoutProgress, TickerOutcome};
pub use scanner::{BatchOutcome, ScanError, Scanner, TickerError};
pub use state::{ScanHit, ScanPhase, ScanState, ScanSummary};
pub use store::{JsonFileStore, MemoryStore, ScanStore, StoreError};
