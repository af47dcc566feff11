//! Error types for the installer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Errors that can occur while installing or updating the converter.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// GitHub refused the request (403 / 429, usually rate limiting).
    #[error("remote access forbidden (HTTP {status})")]
    RemoteAccessForbidden { status: u16 },

    /// GitHub could not be reached at all.
    #[error("release service unreachable: {0}")]
    Unreachable(String),

    /// Unexpected API response.
    #[error("release API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The repository has no releases of any kind.
    #[error("no releases published for {0}")]
    NoReleases(String),

    /// Remote unavailable and nothing cached: cannot proceed offline on first run.
    #[error("could not fetch the latest release and no cached release exists: {cause}")]
    OfflineWithoutCache { cause: String },

    /// No asset of the release matched the expected binary name.
    #[error("release {tag} has no asset matching {pattern}")]
    AssetNotFound { tag: String, pattern: String },

    /// The binary was not on disk after downloading.
    #[error("download finished but {} does not exist", .0.display())]
    DownloadVerificationFailed(PathBuf),

    /// A version string could not be parsed.
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    /// Running `<binary> /version` failed.
    #[error("failed to query installed version: {0}")]
    VersionQuery(String),

    /// Invalid asset pattern.
    #[error("invalid asset pattern: {0}")]
    InvalidPattern(#[from] regex_lite::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallerError {
    /// Whether the cached release may stand in for the remote answer.
    pub fn allows_cache_fallback(&self) -> bool {
        matches!(self, Self::RemoteAccessForbidden { .. } | Self::Unreachable(_))
    }
}
