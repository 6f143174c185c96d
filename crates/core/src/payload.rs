//! Inputs identifying what to install or update.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::declaration::PluginDeclaration;
use crate::identity::{PluginIdentity, UniqueIdentifier};
use crate::source::{InstallSource, PluginCategory};

/// Connection details of a live development session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub key: String,
    pub host: String,
    pub port: u16,
}

/// Source-specific input to an install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPayload {
    /// A marketplace artifact, already validated server-side.
    Marketplace { identifier: UniqueIdentifier },

    /// A release asset of a GitHub repository.
    GitHub {
        repo_url: String,
        version: String,
        package: String,
    },

    /// A package file chosen by the user.
    Local { file: PathBuf },

    /// A plugin connected through a debug session.
    Debugging {
        identity: PluginIdentity,
        category: PluginCategory,
        session: DebugInfo,
    },
}

impl InstallPayload {
    /// Returns the source this payload belongs to.
    pub fn source(&self) -> InstallSource {
        match self {
            Self::Marketplace { .. } => InstallSource::Marketplace,
            Self::GitHub { .. } => InstallSource::GitHub,
            Self::Local { .. } => InstallSource::Local,
            Self::Debugging { .. } => InstallSource::Debugging,
        }
    }
}

/// A package the platform knows about and can install.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPackage {
    /// Platform key of the artifact.
    pub unique_identifier: String,

    /// Manifest of the artifact.
    pub declaration: PluginDeclaration,
}

impl PreparedPackage {
    pub fn new(unique_identifier: impl Into<String>, declaration: PluginDeclaration) -> Self {
        Self {
            unique_identifier: unique_identifier.into(),
            declaration,
        }
    }

    /// Returns the identity declared by the package.
    pub fn identity(&self) -> PluginIdentity {
        self.declaration.identity()
    }
}

/// What an update attempt moves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    /// Swap a marketplace plugin for another published version.
    Marketplace {
        installation_id: String,
        identity: PluginIdentity,
        target_version: String,
    },

    /// Reinstall a GitHub plugin from a newer release.
    GitHub {
        installation_id: String,
        repo: String,
        version: String,
        package: String,
    },
}

impl UpdateTarget {
    /// Returns the installation being updated.
    pub fn installation_id(&self) -> &str {
        match self {
            Self::Marketplace {
                installation_id, ..
            }
            | Self::GitHub {
                installation_id, ..
            } => installation_id,
        }
    }

    /// Returns the version the update moves to.
    pub fn target_version(&self) -> &str {
        match self {
            Self::Marketplace { target_version, .. } => target_version,
            Self::GitHub { version, .. } => version,
        }
    }

    /// Returns the source the installation came from.
    pub fn source(&self) -> InstallSource {
        match self {
            Self::Marketplace { .. } => InstallSource::Marketplace,
            Self::GitHub { .. } => InstallSource::GitHub,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_source() {
        let payload = InstallPayload::Local {
            file: PathBuf::from("plugin.json"),
        };
        assert_eq!(payload.source(), InstallSource::Local);

        let payload = InstallPayload::GitHub {
            repo_url: "https://github.com/acme/weather".to_string(),
            version: "v1.0.0".to_string(),
            package: "weather.json".to_string(),
        };
        assert_eq!(payload.source(), InstallSource::GitHub);
    }
}
