//! Releases published for a plugin repository.

use serde::{Deserialize, Serialize};

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,

    /// File name of the asset.
    pub name: String,

    /// Direct download URL.
    pub download_url: String,
}

/// A published release: a version tag and its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Version-like tag name.
    pub tag_name: String,

    /// Assets in publication order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseInfo {
    /// Creates a release without assets.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            assets: Vec::new(),
        }
    }

    /// Adds an asset.
    pub fn with_asset(
        mut self,
        id: u64,
        name: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        self.assets.push(ReleaseAsset {
            id,
            name: name.into(),
            download_url: download_url.into(),
        });
        self
    }

    /// Finds an asset by file name.
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}
