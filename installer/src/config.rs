//! Configuration for the converter installer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PACKAGE_NAME: &str = "OfficeToPDF.exe";
pub const DEFAULT_OWNER: &str = "cognidox";
pub const DEFAULT_REPO: &str = "OfficeToPDF";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const CACHE_FILE_NAME: &str = "release.json";

/// Where the converter lives and where it comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Directory holding the binary and the release cache.
    pub package_dir: PathBuf,

    /// File name of the binary, also the default asset pattern.
    pub package_name: String,

    /// GitHub owner of the release repository.
    pub owner: String,

    /// GitHub repository name.
    pub repo: String,

    /// Base URL of the GitHub REST API.
    pub api_base_url: String,

    /// Regex matched against asset names; defaults to the escaped package name.
    pub asset_pattern: Option<String>,

    /// Whether an installed binary is checked against the latest release.
    pub check_for_update: bool,
}

impl InstallerConfig {
    /// Create a config for OfficeToPDF in `package_dir`.
    pub fn new(package_dir: impl Into<PathBuf>) -> Self {
        Self {
            package_dir: package_dir.into(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            asset_pattern: None,
            check_for_update: true,
        }
    }

    /// Point at a different API server.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Use a different release repository.
    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self
    }

    /// Override the asset pattern.
    pub fn with_asset_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.asset_pattern = Some(pattern.into());
        self
    }

    /// Enable or disable update checks.
    pub fn with_update_check(mut self, enabled: bool) -> Self {
        self.check_for_update = enabled;
        self
    }

    /// Path of the installed binary.
    pub fn binary_path(&self) -> PathBuf {
        self.package_dir.join(&self.package_name)
    }

    /// Path of the cached release descriptor.
    pub fn cache_path(&self) -> PathBuf {
        self.package_dir.join(CACHE_FILE_NAME)
    }

    /// Pattern used to pick the asset to download.
    pub fn asset_pattern(&self) -> String {
        self.asset_pattern
            .clone()
            .unwrap_or_else(|| regex_lite::escape(&self.package_name))
    }

    /// `owner/repo`.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_installer_config_defaults() {
        let config = InstallerConfig::new("/data/package");

        assert_eq!(config.binary_path(), Path::new("/data/package/OfficeToPDF.exe"));
        assert_eq!(config.cache_path(), Path::new("/data/package/release.json"));
        assert_eq!(config.repository(), "cognidox/OfficeToPDF");
        assert_eq!(config.asset_pattern(), r"OfficeToPDF\.exe");
        assert!(config.check_for_update);
    }

    #[test]
    fn test_installer_config_overrides() {
        let config = InstallerConfig::new("/p")
            .with_repository("me", "fork")
            .with_asset_pattern("^Tool.*\\.exe$")
            .with_update_check(false);

        assert_eq!(config.repository(), "me/fork");
        assert_eq!(config.asset_pattern(), "^Tool.*\\.exe$");
        assert!(!config.check_for_update);
    }
}
