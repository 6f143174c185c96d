//! `GET /repos/{owner}/{repo}/releases` and asset downloads.

use std::time::Duration;

use async_trait::async_trait;
use plugbay_core::{PlugbayError, ReleaseAsset, ReleaseInfo, Result};
use plugbay_engine::ReleaseFetcher;
use reqwest::header::ACCEPT;
use serde::Deserialize;

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Settings for [`GitHubReleases`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, without a trailing slash.
    pub api_base: String,

    /// Bearer token sent with every request.
    pub token: Option<String>,

    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("plugbay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseDto {
    tag_name: String,

    #[serde(default)]
    assets: Vec<AssetDto>,
}

#[derive(Debug, Deserialize)]
struct AssetDto {
    id: u64,
    name: String,
    browser_download_url: String,
}

impl From<ReleaseDto> for ReleaseInfo {
    fn from(dto: ReleaseDto) -> Self {
        dto.assets
            .into_iter()
            .fold(ReleaseInfo::new(dto.tag_name), |release, asset| {
                release.with_asset(asset.id, asset.name, asset.browser_download_url)
            })
    }
}

/// Release fetcher backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubReleases {
    /// Builds a client from `options`.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| PlugbayError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: options.api_base.trim_end_matches('/').to_string(),
            token: options.token.filter(|token| !token.is_empty()),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ReleaseFetcher for GitHubReleases {
    async fn fetch_releases(&self, author: &str, name: &str) -> Result<Vec<ReleaseInfo>> {
        let url = format!("{}/repos/{author}/{name}/releases", self.api_base);
        tracing::debug!(url = %url, "fetching releases");

        let response = self
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network(&format!("{author}/{name}"), e))?;

        let releases: Vec<ReleaseDto> = response
            .json()
            .await
            .map_err(|e| network(&format!("{author}/{name}"), e))?;

        Ok(releases.into_iter().map(ReleaseInfo::from).collect())
    }

    async fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>> {
        tracing::debug!(asset = %asset.name, url = %asset.download_url, "downloading asset");

        let response = self
            .get(&asset.download_url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network(&asset.name, e))?;

        let bytes = response.bytes().await.map_err(|e| network(&asset.name, e))?;
        Ok(bytes.to_vec())
    }
}

fn network(what: &str, error: reqwest::Error) -> PlugbayError {
    tracing::warn!(target_name = what, error = %error, "GitHub request failed");
    match error.status() {
        Some(status) => PlugbayError::Network(format!("{what}: GitHub returned {status}")),
        None => PlugbayError::Network(format!("{what}: {error}")),
    }
}
