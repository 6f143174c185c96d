//! Plugin sources and categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where an installed plugin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallSource {
    /// The platform's curated registry.
    #[serde(rename = "marketplace")]
    Marketplace,

    /// A release asset of a GitHub repository.
    #[serde(rename = "github")]
    GitHub,

    /// A package file supplied by the user.
    #[serde(rename = "package")]
    Local,

    /// A plugin attached through a live development session.
    #[serde(rename = "remote")]
    Debugging,
}

impl InstallSource {
    /// Returns true if installing from this source starts with a package upload.
    pub fn requires_upload(self) -> bool {
        matches!(self, Self::GitHub | Self::Local)
    }

    /// Returns the wire name used by the platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marketplace => "marketplace",
            Self::GitHub => "github",
            Self::Local => "package",
            Self::Debugging => "remote",
        }
    }
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Marketplace => "marketplace",
            Self::GitHub => "GitHub",
            Self::Local => "local package",
            Self::Debugging => "debugging",
        };
        f.write_str(label)
    }
}

/// The kind of capability a plugin provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PluginCategory {
    #[serde(rename = "tools")]
    Tool,

    #[serde(rename = "models")]
    Model,

    #[serde(rename = "endpoints")]
    Extension,
}

impl PluginCategory {
    /// Returns the wire name used by the platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tools",
            Self::Model => "models",
            Self::Extension => "endpoints",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tool" | "tools" => Ok(Self::Tool),
            "model" | "models" => Ok(Self::Model),
            "extension" | "extensions" | "endpoint" | "endpoints" => Ok(Self::Extension),
            other => Err(format!(
                "unknown category '{other}' (expected tool, model or extension)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_wire_names() {
        let json = serde_json::to_string(&InstallSource::Local).unwrap();
        assert_eq!(json, "\"package\"");

        let source: InstallSource = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(source, InstallSource::Debugging);
        assert_eq!(source.as_str(), "remote");
    }

    #[test]
    fn test_requires_upload() {
        assert!(InstallSource::GitHub.requires_upload());
        assert!(InstallSource::Local.requires_upload());
        assert!(!InstallSource::Marketplace.requires_upload());
        assert!(!InstallSource::Debugging.requires_upload());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("tool".parse::<PluginCategory>(), Ok(PluginCategory::Tool));
        assert_eq!("Models".parse::<PluginCategory>(), Ok(PluginCategory::Model));
        assert_eq!(
            "endpoints".parse::<PluginCategory>(),
            Ok(PluginCategory::Extension)
        );
        assert!("widget".parse::<PluginCategory>().is_err());
    }
}
