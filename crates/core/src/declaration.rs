//! Plugin declaration (the manifest shipped inside a package).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlugbayError, Result};
use crate::identity::PluginIdentity;
use crate::source::PluginCategory;

/// Plugin manifest describing an installable artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDeclaration {
    /// Plugin author.
    #[serde(default)]
    pub author: String,

    /// Plugin name.
    pub name: String,

    /// Plugin version.
    pub version: String,

    /// What the plugin provides.
    pub category: PluginCategory,

    /// Free-form tags used for filtering.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Display label per locale.
    #[serde(default)]
    pub label: BTreeMap<String, String>,

    /// Description per locale.
    #[serde(default)]
    pub description: BTreeMap<String, String>,

    /// Icon file name.
    #[serde(default)]
    pub icon: Option<String>,

    /// Whether the marketplace verified the author.
    #[serde(default)]
    pub verified: bool,

    /// Identifier assigned by the platform, if already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_unique_identifier: Option<String>,
}

impl PluginDeclaration {
    /// Creates a minimal declaration.
    pub fn new(identity: &PluginIdentity, category: PluginCategory) -> Self {
        Self {
            author: identity.author.clone(),
            name: identity.name.clone(),
            version: identity.version.clone(),
            category,
            tags: Vec::new(),
            label: BTreeMap::new(),
            description: BTreeMap::new(),
            icon: None,
            verified: false,
            plugin_unique_identifier: None,
        }
    }

    /// Loads a declaration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        Self::from_slice(&content)
    }

    /// Parses a declaration from JSON bytes and validates it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let declaration: Self =
            serde_json::from_slice(bytes).map_err(|e| PlugbayError::Manifest(e.to_string()))?;
        declaration.validate()?;
        Ok(declaration)
    }

    /// Parses a declaration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Converts the declaration to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlugbayError::Manifest(e.to_string()))
    }

    /// Checks the fields every package must carry.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlugbayError::Manifest("name must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(PlugbayError::Manifest(
                "version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the identity declared by the manifest.
    pub fn identity(&self) -> PluginIdentity {
        PluginIdentity::new(&self.author, &self.name, &self.version)
    }

    /// Sets the tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the label for a locale.
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.label.insert(locale.into(), label.into());
        self
    }

    /// Returns the label for a locale, falling back to `en_US` and then the name.
    pub fn label_for(&self, locale: &str) -> &str {
        self.label
            .get(locale)
            .or_else(|| self.label.get("en_US"))
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}
