//! Shared primitives for all blobsweep crates.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across blobsweep crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Fatal setup problem: bad arguments, unreadable or invalid rule file.
    #[error("config error: {0}")]
    Config(String),

    /// One metadata record could not be parsed.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Reading or writing blob metadata failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
