//! Error types for the local library

use shuflowspotify::SpotifyError;

/// Errors raised by the store, the sync engine and the selection reader.
///
/// "No item" is never an error: the operations concerned return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Remote catalog error: {0}")]
    Remote(#[from] SpotifyError),

    /// Internal bookkeeping fault, fatal for the current operation
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The draw this caller was waiting on failed for its owner
    #[error("Shared draw failed: {0}")]
    SharedDraw(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
