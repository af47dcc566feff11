//! Startup gate that installs or updates the converter binary.

use std::path::PathBuf;
use std::process::Stdio;

use regex_lite::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::cache::ReleaseCache;
use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::github::GitHubReleases;
use crate::release::ReleaseDescriptor;
use crate::version::{ReleaseVersion, version_is_current};

/// Flag that makes OfficeToPDF print its version and exit.
const VERSION_FLAG: &str = "/version";

/// Result of [`DependencyInstaller::ensure_installed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The installed binary matches the latest release.
    UpToDate,

    /// No binary was present; `version` was downloaded.
    Installed { version: String },

    /// An outdated binary was replaced.
    Updated { from: String, to: String },

    /// A binary is present and update checks are disabled.
    UpdateCheckSkipped,
}

/// Keeps the converter binary present and current.
pub struct DependencyInstaller {
    config: InstallerConfig,
    releases: GitHubReleases,
    cache: ReleaseCache,
}

impl DependencyInstaller {
    /// Create an installer for `config`.
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let releases = GitHubReleases::new(&config)?;
        let cache = ReleaseCache::new(config.cache_path());
        Ok(Self {
            config,
            releases,
            cache,
        })
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn binary_path(&self) -> PathBuf {
        self.config.binary_path()
    }

    /// Whether the converter binary exists.
    pub fn is_installed(&self) -> bool {
        self.binary_path().is_file()
    }

    /// Make sure the converter is installed, and current when update checks are on.
    pub async fn ensure_installed(&self) -> Result<InstallOutcome> {
        if !self.is_installed() {
            info!(
                "{} not found in {}, downloading",
                self.config.package_name,
                self.config.package_dir.display()
            );
            let release = self.fetch_latest_release().await?;
            self.install(&release).await?;
            return Ok(InstallOutcome::Installed {
                version: release.tag,
            });
        }

        if !self.config.check_for_update {
            debug!("Update check disabled");
            return Ok(InstallOutcome::UpdateCheckSkipped);
        }

        let installed = self.installed_version().await?;
        let release = self.fetch_latest_release().await?;
        let latest = ReleaseVersion::parse(&release.tag)?;

        if version_is_current(&installed, &latest) {
            info!("{} {installed} is up to date", self.config.package_name);
            return Ok(InstallOutcome::UpToDate);
        }

        info!("Updating {} from {installed} to {latest}", self.config.package_name);
        self.install(&release).await?;
        Ok(InstallOutcome::Updated {
            from: installed.to_string(),
            to: release.tag,
        })
    }

    async fn install(&self, release: &ReleaseDescriptor) -> Result<()> {
        if self.download_release(release).await? {
            Ok(())
        } else {
            Err(InstallerError::DownloadVerificationFailed(self.binary_path()))
        }
    }

    /// Ask the installed binary for its version.
    pub async fn installed_version(&self) -> Result<ReleaseVersion> {
        let binary = self.binary_path();
        let output = Command::new(&binary)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| InstallerError::VersionQuery(format!("{}: {e}", binary.display())))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        ReleaseVersion::find_in(&stdout)
            .map_err(|_| InstallerError::VersionQuery(format!("unrecognized output {:?}", stdout.trim())))
    }

    /// Latest release from GitHub, or the cached one when GitHub refuses or
    /// cannot be reached.
    pub async fn fetch_latest_release(&self) -> Result<ReleaseDescriptor> {
        match self.releases.latest_release().await {
            Ok(release) => {
                if let Err(e) = self.cache.store(&release).await {
                    warn!("Failed to cache release {}: {e}", release.tag);
                }
                Ok(release)
            }
            Err(e) if e.allows_cache_fallback() => {
                warn!("Could not fetch latest release: {e}");
                match self.cache.load().await? {
                    Some(release) => {
                        info!("Using cached release {}", release.display_name());
                        Ok(release)
                    }
                    None => Err(InstallerError::OfflineWithoutCache {
                        cause: e.to_string(),
                    }),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Download the matching asset of `release` over the installed binary.
    ///
    /// Returns whether the binary exists afterwards.
    pub async fn download_release(&self, release: &ReleaseDescriptor) -> Result<bool> {
        let pattern = self.config.asset_pattern();
        let regex = Regex::new(&pattern)?;
        let asset = release
            .find_asset(&regex)
            .ok_or_else(|| InstallerError::AssetNotFound {
                tag: release.tag.clone(),
                pattern: pattern.clone(),
            })?;

        info!("Downloading {} ({})", asset.name, release.display_name());
        let mut response = self.releases.download(&asset.download_url).await?;

        fs::create_dir_all(&self.config.package_dir).await?;
        let binary = self.binary_path();
        let mut file = fs::File::create(&binary).await?;

        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).await?;
        }

        debug!("Wrote {written} bytes to {}", binary.display());
        Ok(binary.is_file())
    }
}
