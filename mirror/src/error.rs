//! Error types for the mirror.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while building or tearing down a mirror.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// A path was mapped against a root it does not live under.
    #[error("{} is not under {}", path.display(), root.display())]
    PathNotUnderRoot { path: PathBuf, root: PathBuf },

    /// The staging root is a regular file.
    #[error("staging root must be a directory, not a file: {}", .0.display())]
    InvalidMirrorTarget(PathBuf),

    /// The staging root holds unrelated content.
    #[error("staging root must be empty or an existing mirror: {}", .0.display())]
    DirtyMirrorTarget(PathBuf),

    /// One root contains the other.
    #[error("staging root {} and persistence root {} must not contain each other", staging.display(), persistence.display())]
    NestedMirrorTarget {
        staging: PathBuf,
        persistence: PathBuf,
    },

    /// The persistence root is missing or not a directory.
    #[error("persistence root not found: {}", .0.display())]
    PersistenceRootNotFound(PathBuf),

    /// Directory enumeration failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
