//! # Installer
//!
//! Keeps the OfficeToPDF converter present and current before the pipeline
//! starts.
//!
//! ## Flow
//!
//! ```text
//! binary missing ──► fetch latest release ──► download
//! binary present ──► update checks on? ──► fetch latest release
//!                                               │
//!                         installed >= latest ◄─┴─► download
//! ```
//!
//! Fetching prefers the newest full release and falls back to the newest
//! pre-release. Every successful fetch is cached on disk; when GitHub refuses
//! (rate limit) or cannot be reached, the cached release is used instead.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod installer;
pub mod release;
pub mod version;

pub use cache::{CACHE_SCHEMA_VERSION, ReleaseCache};
pub use config::InstallerConfig;
pub use error::{InstallerError, Result};
pub use github::GitHubReleases;
pub use installer::{DependencyInstaller, InstallOutcome};
pub use release::{ReleaseAsset, ReleaseDescriptor};
pub use version::{ReleaseVersion, version_is_current};
