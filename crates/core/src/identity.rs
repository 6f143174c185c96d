//! Plugin identities and artifact identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a plugin by author, name and declared version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginIdentity {
    /// Plugin author (organization for marketplace plugins, owner for GitHub).
    #[serde(default)]
    pub author: String,

    /// Plugin name.
    pub name: String,

    /// Declared version.
    pub version: String,
}

impl PluginIdentity {
    /// Creates a new identity.
    pub fn new(
        author: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns the version-independent plugin id (`author/name`).
    pub fn plugin_id(&self) -> String {
        if self.author.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.author, self.name)
        }
    }

    /// Returns a copy with a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            author: self.author.clone(),
            name: self.name.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.plugin_id(), self.version)
    }
}

/// The platform's key for one installable artifact: `author/name:version@checksum`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueIdentifier {
    pub author: String,
    pub name: String,
    pub version: String,

    /// Content checksum. Absent when the identifier was typed by hand.
    pub checksum: Option<String>,
}

impl UniqueIdentifier {
    /// Creates an identifier for an identity and optional checksum.
    pub fn new(identity: &PluginIdentity, checksum: Option<String>) -> Self {
        Self {
            author: identity.author.clone(),
            name: identity.name.clone(),
            version: identity.version.clone(),
            checksum,
        }
    }

    /// Returns the identity part of the identifier.
    pub fn identity(&self) -> PluginIdentity {
        PluginIdentity::new(&self.author, &self.name, &self.version)
    }

    /// Returns the version-independent plugin id.
    pub fn plugin_id(&self) -> String {
        self.identity().plugin_id()
    }

    /// Returns true if both identifiers name the same artifact.
    ///
    /// A missing checksum on either side matches any checksum.
    pub fn matches(&self, other: &UniqueIdentifier) -> bool {
        self.author == other.author
            && self.name == other.name
            && self.version == other.version
            && match (&self.checksum, &other.checksum) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.author.is_empty() {
            write!(f, "{}/", self.author)?;
        }
        write!(f, "{}:{}", self.name, self.version)?;
        if let Some(checksum) = &self.checksum {
            write!(f, "@{checksum}")?;
        }
        Ok(())
    }
}

/// A GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl GitHubRepo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Returns the `owner/repo` slug.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Returns the repository's web URL.
    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_id() {
        let identity = PluginIdentity::new("langgenius", "google", "0.1.0");
        assert_eq!(identity.plugin_id(), "langgenius/google");

        let anonymous = PluginIdentity::new("", "local-tool", "0.1.0");
        assert_eq!(anonymous.plugin_id(), "local-tool");
    }

    #[test]
    fn test_unique_identifier_display() {
        let identity = PluginIdentity::new("acme", "search", "1.2.0");
        let id = UniqueIdentifier::new(&identity, Some("abc123".to_string()));
        assert_eq!(id.to_string(), "acme/search:1.2.0@abc123");

        let id = UniqueIdentifier::new(&identity, None);
        assert_eq!(id.to_string(), "acme/search:1.2.0");
    }

    #[test]
    fn test_unique_identifier_matches_without_checksum() {
        let identity = PluginIdentity::new("acme", "search", "1.2.0");
        let full = UniqueIdentifier::new(&identity, Some("abc".to_string()));
        let bare = UniqueIdentifier::new(&identity, None);
        let other = UniqueIdentifier::new(&identity, Some("def".to_string()));

        assert!(full.matches(&bare));
        assert!(bare.matches(&full));
        assert!(!full.matches(&other));
        assert!(!full.matches(&UniqueIdentifier::new(&identity.with_version("1.3.0"), None)));
    }

    #[test]
    fn test_github_repo_url() {
        let repo = GitHubRepo::new("acme", "weather-plugin");
        assert_eq!(repo.slug(), "acme/weather-plugin");
        assert_eq!(repo.url(), "https://github.com/acme/weather-plugin");
    }
}
