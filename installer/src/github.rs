//! GitHub releases client.

use reqwest::{Response, StatusCode};
use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::release::{GitHubRelease, ReleaseDescriptor};

const USER_AGENT: &str = concat!("autopdf/", env!("CARGO_PKG_VERSION"));

/// Reads releases of one repository from the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    /// HTTP client.
    client: reqwest::Client,

    /// API base URL.
    base_url: String,

    /// Repository owner.
    owner: String,

    /// Repository name.
    repo: String,
}

impl GitHubReleases {
    /// Create a client for the repository named in `config`.
    pub fn new(config: &InstallerConfig) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    /// The newest full release, or the newest release of any kind when the
    /// repository has no full release yet.
    pub async fn latest_release(&self) -> Result<ReleaseDescriptor> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.base_url, self.owner, self.repo);
        let response = self.get(&url).await?;

        match response.status() {
            status if status.is_success() => {
                let release: ReleaseDescriptor = response.json::<GitHubRelease>().await?.into();
                info!("Latest release: {}", release.display_name());
                Ok(release)
            }
            StatusCode::NOT_FOUND => {
                let release = self.newest_release().await?;
                info!(
                    "There are no full releases available yet, using {}",
                    release.display_name()
                );
                Ok(release)
            }
            status => Err(status_error(status, response).await),
        }
    }

    /// The most recent entry of the release list, pre-releases included.
    async fn newest_release(&self) -> Result<ReleaseDescriptor> {
        let url = format!("{}/repos/{}/{}/releases?per_page=1", self.base_url, self.owner, self.repo);
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(status_error(response.status(), response).await);
        }

        let releases: Vec<GitHubRelease> = response.json().await?;
        releases
            .into_iter()
            .next()
            .map(ReleaseDescriptor::from)
            .ok_or_else(|| InstallerError::NoReleases(format!("{}/{}", self.owner, self.repo)))
    }

    /// Start downloading an asset. The caller streams the body.
    pub async fn download(&self, url: &str) -> Result<Response> {
        let response = self.send(self.client.get(url)).await?;

        if !response.status().is_success() {
            return Err(status_error(response.status(), response).await);
        }
        Ok(response)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {url}");
        self.send(
            self.client
                .get(url)
                .header("Accept", "application/vnd.github+json"),
        )
        .await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                InstallerError::Unreachable(e.to_string())
            } else {
                InstallerError::Http(e)
            }
        })
    }
}

async fn status_error(status: StatusCode, response: Response) -> InstallerError {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return InstallerError::RemoteAccessForbidden {
            status: status.as_u16(),
        };
    }

    let message = response.text().await.unwrap_or_default();
    InstallerError::Api {
        status: status.as_u16(),
        message,
    }
}
