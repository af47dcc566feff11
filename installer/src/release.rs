//! Release descriptors.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name.
    pub name: String,

    /// Direct download URL.
    pub download_url: String,
}

/// A published version of the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Git tag, e.g. `v1.9.0.2`.
    pub tag: String,

    /// Display name, if any.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether this is a pre-release.
    #[serde(default)]
    pub prerelease: bool,

    /// Downloadable assets.
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseDescriptor {
    /// First asset whose name matches `pattern`.
    pub fn find_asset(&self, pattern: &Regex) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| pattern.is_match(&asset.name))
    }

    /// Name for log lines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.tag)
    }
}

/// GitHub API release payload.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubRelease {
    tag_name: String,
    name: Option<String>,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

impl From<GitHubRelease> for ReleaseDescriptor {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag: release.tag_name,
            name: release.name,
            prerelease: release.prerelease,
            assets: release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name,
                    download_url: asset.browser_download_url,
                })
                .collect(),
        }
    }
}
