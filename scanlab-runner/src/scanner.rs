//! Scan orchestrator — walks a universe in checkpointed batches.
//!
//! Each call to [`Scanner::continue_scan`] processes at most
//! `checkpoint_batch_size` unscanned tickers, applies their results to the
//! [`ScanState`] one ticker at a time, saves the state through the store and
//! returns. Callers either loop themselves (a long-running service, a UI) or
//! use [`Scanner::run_to_completion`].
//!
//! Per-ticker failures never abort the pass: the ticker is marked scanned and
//! counted in `failed_count`. Only misconfiguration is a [`ScanError`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use scanlab_core::data::{fetch_series, DataError, DataProvider, Universe};
use scanlab_core::evaluate::{Evaluator, SymbolReport};
use scanlab_core::CoreError;

use crate::config::{ConfigError, ScanConfig};
use crate::pacing::RequestPacer;
use crate::progress::{ScanProgress, TickerOutcome};
use crate::state::{ScanHit, ScanPhase, ScanState, ScanSummary};
use crate::store::{ScanStore, StoreError};

/// Errors that stop a scan before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("universe is empty")]
    EmptyUniverse,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("build fetch pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a single ticker could not be evaluated.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Compute(#[from] CoreError),
}

/// Result of one checkpointed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Tickers attempted in this batch.
    pub processed: usize,
    pub qualified: usize,
    pub failed: usize,
    /// The batch stopped early because the cancel flag was raised.
    pub cancelled: bool,
    /// The checkpoint save failed; the in-memory state is still current.
    pub save_failed: bool,
    pub summary: ScanSummary,
}

pub struct Scanner {
    provider: Arc<dyn DataProvider>,
    store: Arc<dyn ScanStore>,
    config: ScanConfig,
    evaluator: Evaluator,
    pool: Option<rayon::ThreadPool>,
    pacer: RequestPacer,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scanner {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        store: Arc<dyn ScanStore>,
        config: ScanConfig,
    ) -> Result<Self, ScanError> {
        config.validate()?;
        let evaluator = Evaluator::new(config.evaluation()).map_err(|e| {
            ScanError::InvalidConfig(ConfigError::Invalid {
                field: "signals",
                reason: e.to_string(),
            })
        })?;

        let pool = if config.scan.fetch_concurrency > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.scan.fetch_concurrency)
                    .thread_name(|i| format!("scanlab-fetch-{i}"))
                    .build()
                    .map_err(|e| ScanError::ThreadPool(e.to_string()))?,
            )
        } else {
            None
        };

        let pacer = RequestPacer::from_millis(config.scan.request_delay_ms);
        Ok(Self {
            provider,
            store,
            config,
            evaluator,
            pool,
            pacer,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Saved state, or a fresh one when nothing is saved or the save is unreadable.
    pub fn load_state(&self) -> ScanState {
        match self.store.load() {
            Ok(Some(state)) => state,
            Ok(None) => ScanState::new(),
            Err(e) => {
                warn!(error = %e, "could not load scan state, starting fresh");
                ScanState::new()
            }
        }
    }

    /// Load the saved state and run one batch on it.
    pub fn start(
        &self,
        universe: &Universe,
        progress: &dyn ScanProgress,
        cancel: Option<&AtomicBool>,
    ) -> Result<(ScanState, BatchOutcome), ScanError> {
        let mut state = self.load_state();
        let outcome = self.continue_scan(universe, &mut state, progress, cancel)?;
        Ok((state, outcome))
    }

    /// Process the next batch of unscanned tickers, then checkpoint.
    ///
    /// With nothing left to scan this only settles `fully_scanned`, so repeated
    /// calls on a finished scan leave the state untouched.
    pub fn continue_scan(
        &self,
        universe: &Universe,
        state: &mut ScanState,
        progress: &dyn ScanProgress,
        cancel: Option<&AtomicBool>,
    ) -> Result<BatchOutcome, ScanError> {
        if universe.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }

        let remaining = state.remaining(universe);
        if remaining.is_empty() {
            let mut save_failed = false;
            if !state.fully_scanned {
                state.fully_scanned = true;
                save_failed = !self.checkpoint(state);
            }
            return Ok(BatchOutcome {
                processed: 0,
                qualified: 0,
                failed: 0,
                cancelled: false,
                save_failed,
                summary: state.summary(universe),
            });
        }

        // New tickers reopen a finished scan.
        state.fully_scanned = false;

        let batch: Vec<&str> = remaining
            .into_iter()
            .take(self.config.scan.checkpoint_batch_size)
            .collect();
        let mut summary = state.summary(universe);
        summary.phase = ScanPhase::Scanning;
        progress.on_batch_start(&summary, batch.len());
        info!(
            batch = batch.len(),
            scanned = summary.scanned,
            universe = summary.universe_size,
            "scan batch started"
        );

        let started = Instant::now();
        let total = universe.len();
        let mut position = summary.scanned;
        let (mut processed, mut qualified, mut failed) = (0, 0, 0);
        let mut cancelled = false;

        // Sequential mode fetches one ticker per step; pooled mode one chunk.
        let step = self.pool.as_ref().map_or(1, |_| self.config.scan.fetch_concurrency);
        for chunk in batch.chunks(step) {
            if is_cancelled(cancel) {
                cancelled = true;
                break;
            }

            for (ticker, result) in chunk.iter().zip(self.evaluate_chunk(chunk)) {
                position += 1;
                processed += 1;
                let outcome = self.apply(state, ticker, result);
                match &outcome {
                    TickerOutcome::Qualified(_) => qualified += 1,
                    TickerOutcome::Failed(_) => failed += 1,
                    TickerOutcome::Rejected => {}
                }
                progress.on_ticker(position, total, ticker, &outcome);
            }
        }

        if state.remaining(universe).is_empty() {
            state.fully_scanned = true;
        }
        let save_failed = !self.checkpoint(state);

        let outcome = BatchOutcome {
            processed,
            qualified,
            failed,
            cancelled,
            save_failed,
            summary: state.summary(universe),
        };
        info!(
            processed,
            qualified,
            failed,
            remaining = outcome.summary.remaining,
            phase = %outcome.summary.phase,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "checkpoint"
        );
        progress.on_checkpoint(&outcome);
        Ok(outcome)
    }

    /// Run batches until the universe is covered or `cancel` is raised.
    pub fn run_to_completion(
        &self,
        universe: &Universe,
        state: &mut ScanState,
        progress: &dyn ScanProgress,
        cancel: Option<&AtomicBool>,
    ) -> Result<ScanSummary, ScanError> {
        loop {
            let outcome = self.continue_scan(universe, state, progress, cancel)?;
            if outcome.cancelled || outcome.summary.phase.is_terminal() {
                return Ok(outcome.summary);
            }
        }
    }

    /// Clear the state in place and delete the saved copy.
    pub fn reset(&self, state: &mut ScanState) -> Result<(), ScanError> {
        *state = ScanState::new();
        self.store.clear()?;
        info!("scan state reset");
        Ok(())
    }

    fn evaluate_chunk(&self, chunk: &[&str]) -> Vec<Result<SymbolReport, TickerError>> {
        match &self.pool {
            Some(pool) if chunk.len() > 1 => pool.install(|| {
                chunk
                    .par_iter()
                    .map(|ticker| self.evaluate_ticker(ticker))
                    .collect()
            }),
            _ => chunk.iter().map(|ticker| self.evaluate_ticker(ticker)).collect(),
        }
    }

    fn evaluate_ticker(&self, ticker: &str) -> Result<SymbolReport, TickerError> {
        self.pacer.wait();
        let series = fetch_series(
            self.provider.as_ref(),
            ticker,
            self.config.scan.period,
            self.config.scan.interval,
        )?;
        Ok(self.evaluator.evaluate(&series)?)
    }

    /// Fold one ticker's result into the state. The single writer of `state`.
    fn apply(
        &self,
        state: &mut ScanState,
        ticker: &str,
        result: Result<SymbolReport, TickerError>,
    ) -> TickerOutcome {
        state.scanned_symbols.insert(ticker.to_string());
        match result {
            Ok(report) => match ScanHit::qualify(&report, &self.config.filter) {
                Some(hit) => {
                    debug!(
                        ticker,
                        signals = %hit.signal_label(),
                        win_rate = hit.win_rate,
                        profit_factor = hit.profit_factor,
                        "qualified"
                    );
                    state.high_prob.push(hit.clone());
                    TickerOutcome::Qualified(Box::new(hit))
                }
                None => {
                    debug!(ticker, signal = report.signal.is_some(), "not qualified");
                    TickerOutcome::Rejected
                }
            },
            Err(e) => {
                warn!(ticker, error = %e, "ticker failed");
                state.failed_count += 1;
                TickerOutcome::Failed(e.to_string())
            }
        }
    }

    /// Persist `state`. A failed save is logged and reported, never fatal.
    fn checkpoint(&self, state: &ScanState) -> bool {
        match self.store.save(state) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "checkpoint save failed, continuing in memory");
                false
            }
        }
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}
