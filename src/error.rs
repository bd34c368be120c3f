//! Error types for ledger-export
//!
//! The taxonomy is deliberately small:
//! - `InvalidRange` / `InvalidWorkerCount` are partitioner input violations,
//!   fatal before any worker launches or any I/O begins.
//! - `Transport` and `Protocol` are remote failures; the retry layer treats
//!   both uniformly as retryable.
//! - `Io` / `Csv` are sink failures, which a worker treats as unrecoverable.

use thiserror::Error;

/// Result type alias for ledger-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ledger-export
#[derive(Debug, Error)]
pub enum Error {
    /// The requested ledger range is inverted (end precedes start)
    #[error("invalid range: end index {end} precedes start index {start}")]
    InvalidRange {
        /// Requested first ledger index
        start: u32,
        /// Requested last ledger index
        end: u32,
    },

    /// The worker count cannot split a range into at least one partition
    #[error("invalid worker count: {0} (at least 1 worker is required)")]
    InvalidWorkerCount(usize),

    /// Network or connection failure while talking to the rippled node
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed or error-bearing JSON-RPC response
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error while writing a partition's output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for errors that can be classified as retryable or not
///
/// Transient remote failures (rate limiting, node busy, connection reset)
/// should return `true`. Local failures (bad range, disk errors) should
/// return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Remote errors are treated uniformly as retryable: a rippled node
            // that rate-limits or returns a transient lookup failure usually
            // recovers within a few attempts.
            Error::Transport(_) | Error::Protocol(_) => true,
            // Range validation errors are caller bugs, never retried
            Error::InvalidRange { .. } | Error::InvalidWorkerCount(_) => false,
            // Sink failures need operator action, not retries
            Error::Io(_) | Error::Csv(_) => false,
            // Serialization errors are permanent
            Error::Serialization(_) => false,
        }
    }
}
