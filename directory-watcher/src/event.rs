//! File events from watching the staging tree.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file creation observed in the staging tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    /// Path to the created file.
    pub path: PathBuf,

    /// When the creation was observed.
    pub observed_at: DateTime<Utc>,
}

impl FileEvent {
    /// Create a new file event observed now.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            observed_at: Utc::now(),
        }
    }
}

/// Kind of raw file system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    /// File was created.
    Created,

    /// File was modified.
    Modified,

    /// File was deleted.
    Deleted,

    /// File was renamed.
    Renamed,

    /// Access or metadata only.
    Other,
}

impl From<notify::EventKind> for FileEventKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => Self::Created,
            notify::EventKind::Modify(notify::event::ModifyKind::Name(_)) => Self::Renamed,
            notify::EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => Self::Other,
            notify::EventKind::Modify(_) => Self::Modified,
            notify::EventKind::Remove(_) => Self::Deleted,
            _ => Self::Other,
        }
    }
}
