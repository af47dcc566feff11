//! Moving files and directories to the platform trash.
//!
//! Nothing in autopdf hard-deletes user data. Both the staging tree teardown and the
//! removal of converted sources go through a [`Recycler`], so tests can swap the
//! platform trash for something deterministic.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Result type alias for trash operations.
pub type Result<T> = std::result::Result<T, TrashError>;

/// Errors that can occur while recycling a path.
#[derive(Error, Debug)]
pub enum TrashError {
    /// The platform refused to move the path.
    #[error("permission denied while moving to trash: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Nothing exists at the path.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other platform failure.
    #[error("failed to move {} to trash: {message}", path.display())]
    Platform { path: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrashError {
    /// Whether this failure is a permission problem the user has to resolve by hand.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

/// Something that can take a path away from the user's view without destroying it.
pub trait Recycler: Send + Sync {
    /// Move `path` (file or directory) out of the way.
    fn recycle(&self, path: &Path) -> Result<()>;
}

/// Recycler backed by the operating system trash / recycle bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl SystemTrash {
    pub fn new() -> Self {
        Self
    }
}

impl Recycler for SystemTrash {
    fn recycle(&self, path: &Path) -> Result<()> {
        if std::fs::symlink_metadata(path).is_err() {
            return Err(TrashError::NotFound(path.to_path_buf()));
        }

        debug!("Moving {} to trash", path.display());
        trash::delete(path).map_err(|e| classify(path, e))
    }
}

// EPERM / EACCES on unix, ERROR_ACCESS_DENIED on windows.
const PERMISSION_CODES: &[i32] = &[1, 5, 13];

fn classify(path: &Path, err: trash::Error) -> TrashError {
    let message = err.to_string();
    let permission = match &err {
        trash::Error::CouldNotAccess { .. } => true,
        trash::Error::Os { code, .. } => PERMISSION_CODES.contains(code),
        _ => false,
    };

    if permission || message.to_ascii_lowercase().contains("permission denied") {
        TrashError::PermissionDenied(path.to_path_buf())
    } else {
        TrashError::Platform {
            path: path.to_path_buf(),
            message,
        }
    }
}

/// Recycler that deletes outright. Used where no trash exists (tests, headless CI).
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveRecycler;

impl Recycler for RemoveRecycler {
    fn recycle(&self, path: &Path) -> Result<()> {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrashError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
