//! Configuration for watching the staging tree.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wildmatch::WildMatch;

/// How long a creation event is held before it is queued.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Configuration for the staging watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between observing a creation and queueing it, in milliseconds.
    pub debounce_ms: u64,

    /// File name patterns that are never queued (`*` and `?` wildcards).
    pub exclude_patterns: Vec<String>,
}

impl WatcherConfig {
    /// Create a config with the default debounce and exclusions.
    pub fn new() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            exclude_patterns: Self::default_excludes(),
        }
    }

    /// Set the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// The debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Lock and scratch files that office suites drop next to open documents.
    fn default_excludes() -> Vec<String> {
        vec![
            // Microsoft Office owner files
            "~$*".to_string(),
            // LibreOffice lock files
            ".~lock.*#".to_string(),
            // Temporary files
            "*.tmp".to_string(),
            "~*.tmp".to_string(),
        ]
    }

    /// Check if a path should be excluded, by file name.
    pub fn should_exclude(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return true;
        };

        self.exclude_patterns
            .iter()
            .any(|pattern| WildMatch::new(pattern).matches(&name))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}
