//! Marketplace references typed by users.

use std::fmt;

use plugbay_core::PluginIdentity;

/// `author/name` with an optional version (`@1.2.0` or `:1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceRef {
    pub author: String,
    pub name: String,
    pub version: Option<String>,
}

impl MarketplaceRef {
    /// Returns the plugin id (`author/name`).
    pub fn plugin_id(&self) -> String {
        format!("{}/{}", self.author, self.name)
    }

    /// Converts to an identity, using `fallback` when no version was given.
    pub fn identity_or(&self, fallback: &str) -> PluginIdentity {
        PluginIdentity::new(
            &self.author,
            &self.name,
            self.version.as_deref().unwrap_or(fallback),
        )
    }
}

impl fmt::Display for MarketplaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.author, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}
