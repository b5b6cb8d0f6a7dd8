//! Computation errors shared by the indicator engine, signal detector and backtest.

use thiserror::Error;

/// Errors raised by the pure computation layer.
///
/// `InvalidInput` means the caller handed over something malformed and should not
/// happen with validated upstream data. `InsufficientData` is recoverable: the
/// orchestrator counts the ticker as failed and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}

impl CoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidInput(msg.into())
    }
}
