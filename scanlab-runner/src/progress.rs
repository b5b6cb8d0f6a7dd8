//! Progress reporting hooks for the scanner.

use crate::scanner::BatchOutcome;
use crate::state::{ScanHit, ScanSummary};

/// What happened to one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    /// Evaluated and added to the high-probability list.
    Qualified(Box<ScanHit>),
    /// Evaluated; no signal or below the thresholds.
    Rejected,
    /// Fetch or computation failed; counted in `failed_count`.
    Failed(String),
}

/// Callbacks the scanner fires while it works. All default to no-ops.
///
/// `position` and `total` count against the whole universe, so a resumed scan
/// keeps counting from where the previous pass stopped.
pub trait ScanProgress {
    fn on_batch_start(&self, _summary: &ScanSummary, _batch_len: usize) {}

    fn on_ticker(&self, _position: usize, _total: usize, _ticker: &str, _outcome: &TickerOutcome) {}

    fn on_checkpoint(&self, _outcome: &BatchOutcome) {}
}

/// Silent progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// Prints one `[i/n]` line per ticker and a line per checkpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_batch_start(&self, summary: &ScanSummary, batch_len: usize) {
        println!(
            "Scanning {batch_len} tickers ({} of {} already done)",
            summary.scanned, summary.universe_size
        );
    }

    fn on_ticker(&self, position: usize, total: usize, ticker: &str, outcome: &TickerOutcome) {
        match outcome {
            TickerOutcome::Qualified(hit) => println!(
                "[{position}/{total}] {ticker:<10} HIT  {} (win {:.1}%, PF {:.2}, n={})",
                hit.signal_label(),
                hit.win_rate * 100.0,
                hit.profit_factor,
                hit.sample_count
            ),
            TickerOutcome::Rejected => println!("[{position}/{total}] {ticker:<10} --"),
            TickerOutcome::Failed(reason) => {
                println!("[{position}/{total}] {ticker:<10} FAIL {reason}")
            }
        }
    }

    fn on_checkpoint(&self, outcome: &BatchOutcome) {
        println!(
            "Checkpoint: {} processed, {} hits, {} failed, {} remaining ({})",
            outcome.processed,
            outcome.qualified,
            outcome.failed,
            outcome.summary.remaining,
            outcome.summary.phase
        );
    }
}
