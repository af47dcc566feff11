//! Error types for the directory watcher.

use thiserror::Error;

use crate::watcher::WatcherState;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur in the directory watcher.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Operation not allowed in the current state.
    #[error("watcher is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: WatcherState,
        actual: WatcherState,
    },

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The consuming side of the job queue is gone.
    #[error("channel error: job queue closed")]
    ChannelSend,
}
