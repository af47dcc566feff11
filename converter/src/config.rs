//! Configuration for the conversion pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the conversion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the converter executable.
    pub binary_path: PathBuf,

    /// Directory handed to the converter as its working directory.
    pub package_dir: PathBuf,

    /// How long a single pop waits for a job, in milliseconds.
    pub pop_timeout_ms: u64,

    /// Sleep after an empty pop, in milliseconds.
    pub idle_interval_ms: u64,

    /// Sleep after a failed conversion, in milliseconds.
    pub backoff_interval_ms: u64,
}

impl PipelineConfig {
    /// Create a config with default intervals.
    pub fn new(binary_path: impl Into<PathBuf>, package_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            package_dir: package_dir.into(),
            pop_timeout_ms: 200,
            idle_interval_ms: 1000,
            backoff_interval_ms: 200,
        }
    }

    /// Set the pop timeout.
    pub fn with_pop_timeout(mut self, timeout: Duration) -> Self {
        self.pop_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the idle interval.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the backoff interval.
    pub fn with_backoff_interval(mut self, interval: Duration) -> Self {
        self.backoff_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn pop_timeout(&self) -> Duration {
        Duration::from_millis(self.pop_timeout_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn backoff_interval(&self) -> Duration {
        Duration::from_millis(self.backoff_interval_ms)
    }
}
