//! Error types for initiative tracking.

use kd_core::DiceError;

/// Errors that can occur while managing an initiative list.
#[derive(Debug, thiserror::Error)]
pub enum InitiativeError {
    /// The operation needs at least one entry.
    #[error("the initiative list is empty")]
    EmptyList,

    /// A stored blob could not be decoded.
    #[error("corrupt initiative state: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A stored blob names the same entry twice.
    #[error("corrupt initiative state: '{0}' appears more than once")]
    DuplicateEntry(String),

    /// The blob store failed.
    #[error("initiative storage failed: {0}")]
    Store(#[from] std::io::Error),

    /// An initiative roll could not be evaluated. The message is passed
    /// through verbatim.
    #[error("{0}")]
    RandomSource(#[from] DiceError),
}

/// Convenience result type for initiative operations.
pub type InitiativeResult<T> = Result<T, InitiativeError>;
