//! On-disk snapshot of the last fetched release.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::release::ReleaseDescriptor;

/// Bumped whenever the layout of [`CachedRelease`] changes.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Serialized form of the cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedRelease {
    /// Layout version of this record.
    pub schema_version: u32,

    /// When the release was fetched from the remote.
    pub fetched_at: DateTime<Utc>,

    /// The release itself.
    pub release: ReleaseDescriptor,
}

/// Cache holding a single release descriptor.
#[derive(Debug, Clone)]
pub struct ReleaseCache {
    path: PathBuf,
}

impl ReleaseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the cached release.
    pub async fn store(&self, release: &ReleaseDescriptor) -> Result<()> {
        let record = CachedRelease {
            schema_version: CACHE_SCHEMA_VERSION,
            fetched_at: Utc::now(),
            release: release.clone(),
        };
        let content = serde_json::to_string_pretty(&record)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.path, content).await?;
        debug!("Cached release {} at {}", release.tag, self.path.display());
        Ok(())
    }

    /// Read the cached release.
    ///
    /// A missing file, one that does not decode as the JSON record (including
    /// non-UTF-8 leftovers), or one with a foreign schema is treated as no cache.
    pub async fn load(&self) -> Result<Option<ReleaseDescriptor>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read(&self.path).await?;
        let record: CachedRelease = match serde_json::from_slice(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable release cache {}: {e}", self.path.display());
                return Ok(None);
            }
        };

        if record.schema_version != CACHE_SCHEMA_VERSION {
            warn!(
                "Ignoring release cache with schema version {}",
                record.schema_version
            );
            return Ok(None);
        }

        info!(
            "Loaded cached release {} (fetched {})",
            record.release.tag, record.fetched_at
        );
        Ok(Some(record.release))
    }
}
