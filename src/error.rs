//! Error types shared across the crate.
//!
use thiserror::Error;

/// Failure of a single user-list fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch users: status {0}")]
    Status(u16),

    #[error("Failed to fetch users: {0}")]
    Network(String),

    #[error("Failed to parse users: {0}")]
    Decode(String),

    /// The request was cancelled before it completed. Never shown to the operator.
    #[error("fetch aborted")]
    Aborted,
}

impl FetchError {
    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}

/// Failure reading or writing the on-disk response cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cache directory available")]
    NoDirectory,

    #[error("cache io: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}
