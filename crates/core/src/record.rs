//! Installed plugin records as reported by the platform registry.

use serde::{Deserialize, Serialize};

use crate::identity::PluginIdentity;
use crate::source::{InstallSource, PluginCategory};

/// Version-control metadata kept for plugins installed from GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsMeta {
    /// Repository slug (`owner/repo`).
    pub repo: String,

    /// Installed release tag.
    pub version: String,

    /// Asset file name the package came from.
    pub package: String,
}

/// One installation of a plugin in the current workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPluginRecord {
    /// Installation id, distinct from the plugin identity.
    pub installation_id: String,

    /// Author, name and installed version.
    pub identity: PluginIdentity,

    /// Platform key of the installed artifact.
    pub unique_identifier: String,

    /// Declared category.
    pub category: PluginCategory,

    /// Declared tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Number of enabled endpoints.
    #[serde(default)]
    pub endpoints_active: u32,

    /// Where the plugin was installed from.
    pub source: InstallSource,

    /// Newest version known to the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,

    /// Repository metadata, present for GitHub installs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<VcsMeta>,
}

impl InstalledPluginRecord {
    /// Creates a record with no tags, endpoints or metadata.
    pub fn new(
        installation_id: impl Into<String>,
        identity: PluginIdentity,
        category: PluginCategory,
        source: InstallSource,
    ) -> Self {
        Self {
            installation_id: installation_id.into(),
            unique_identifier: identity.to_string(),
            identity,
            category,
            tags: Vec::new(),
            endpoints_active: 0,
            source,
            latest_version: None,
            meta: None,
        }
    }

    /// Returns the version-independent plugin id used for searching.
    pub fn plugin_id(&self) -> String {
        self.identity.plugin_id()
    }

    /// Returns the installed version.
    pub fn version(&self) -> &str {
        &self.identity.version
    }

    /// Only GitHub installs advertise pending updates through `latest_version`.
    pub fn has_new_version(&self) -> bool {
        self.source == InstallSource::GitHub
            && self
                .latest_version
                .as_deref()
                .is_some_and(|latest| latest != self.identity.version)
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the unique identifier.
    pub fn with_unique_identifier(mut self, unique_identifier: impl Into<String>) -> Self {
        self.unique_identifier = unique_identifier.into();
        self
    }

    /// Sets the repository metadata.
    pub fn with_meta(mut self, meta: VcsMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Sets the latest known version.
    pub fn with_latest_version(mut self, version: impl Into<String>) -> Self {
        self.latest_version = Some(version.into());
        self
    }

    /// Sets the enabled endpoint count.
    pub fn with_endpoints_active(mut self, count: u32) -> Self {
        self.endpoints_active = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github_record(version: &str) -> InstalledPluginRecord {
        InstalledPluginRecord::new(
            "inst-1",
            PluginIdentity::new("acme", "weather", version),
            PluginCategory::Tool,
            InstallSource::GitHub,
        )
    }

    #[test]
    fn test_has_new_version_only_for_github() {
        let record = github_record("1.0.0").with_latest_version("1.1.0");
        assert!(record.has_new_version());

        let current = github_record("1.1.0").with_latest_version("1.1.0");
        assert!(!current.has_new_version());

        let mut marketplace = github_record("1.0.0").with_latest_version("1.1.0");
        marketplace.source = InstallSource::Marketplace;
        assert!(!marketplace.has_new_version());

        assert!(!github_record("1.0.0").has_new_version());
    }

    #[test]
    fn test_record_roundtrips_through_json() {
        let record = github_record("1.0.0")
            .with_tags(["search"])
            .with_meta(VcsMeta {
                repo: "acme/weather".to_string(),
                version: "v1.0.0".to_string(),
                package: "weather.json".to_string(),
            });

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"source\":\"github\""));
        assert!(!json.contains("latest_version"));

        let parsed: InstalledPluginRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
