//! Exclusive in-flight attempts per plugin.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use plugbay_core::{InstallPayload, PlugbayError, Result, UpdateTarget};

/// Keys of attempts that have not reached a terminal step.
#[derive(Debug, Clone, Default)]
pub struct AttemptSet {
    active: Arc<Mutex<HashSet<String>>>,
}

/// Holds a key in the set until dropped.
#[derive(Debug)]
pub struct AttemptGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl AttemptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, failing if another attempt holds it.
    pub fn acquire(&self, key: impl Into<String>) -> Result<AttemptGuard> {
        let key = key.into();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if !active.insert(key.clone()) {
            return Err(PlugbayError::AttemptInProgress(key));
        }

        Ok(AttemptGuard {
            key,
            active: Arc::clone(&self.active),
        })
    }

    /// Returns true if `key` is held.
    pub fn is_active(&self, key: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl AttemptGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Returns the key an install of `payload` holds while in flight.
///
/// GitHub installs are keyed by the lower-cased `owner/repo`, so every
/// spelling of one repository shares a key with updates of plugins
/// installed from it.
pub fn install_key(payload: &InstallPayload) -> String {
    match payload {
        InstallPayload::Marketplace { identifier } => identifier.plugin_id(),
        InstallPayload::GitHub { repo_url, .. } => github_key(repo_url),
        InstallPayload::Local { file } => format!("file:{}", file.display()),
        InstallPayload::Debugging { identity, .. } => identity.plugin_id(),
    }
}

/// Returns the key an update to `target` holds while in flight.
pub fn update_key(target: &UpdateTarget) -> String {
    match target {
        UpdateTarget::Marketplace { identity, .. } => identity.plugin_id(),
        UpdateTarget::GitHub { repo, .. } => github_key(repo),
    }
}

fn github_key(repo_url: &str) -> String {
    let slug = match plugbay_parser::parse_github_url(repo_url) {
        Ok(repo) => repo.slug(),
        Err(_) => repo_url.trim().trim_end_matches('/').to_string(),
    };
    format!("github:{}", slug.to_lowercase())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use plugbay_core::{PluginIdentity, UniqueIdentifier};

    use super::*;

    fn github_payload(repo_url: &str) -> InstallPayload {
        InstallPayload::GitHub {
            repo_url: repo_url.to_string(),
            version: "v1.0.0".to_string(),
            package: "weather.json".to_string(),
        }
    }

    #[test]
    fn test_second_acquire_fails_until_released() {
        let set = AttemptSet::new();
        let guard = set.acquire("acme/search").unwrap();
        assert!(set.is_active("acme/search"));

        let err = set.acquire("acme/search").unwrap_err();
        assert!(matches!(err, PlugbayError::AttemptInProgress(ref key) if key == "acme/search"));

        drop(guard);
        assert!(!set.is_active("acme/search"));
        assert!(set.acquire("acme/search").is_ok());
    }

    #[test]
    fn test_independent_keys() {
        let set = AttemptSet::new();
        let _a = set.acquire("a").unwrap();
        let _b = set.acquire("b").unwrap();
        assert!(set.is_active("a"));
        assert!(set.is_active("b"));
    }

    #[test]
    fn test_github_spellings_share_a_key() {
        let keys: Vec<String> = [
            "https://github.com/acme/weather",
            "acme/weather",
            "https://github.com/acme/weather.git",
            "https://github.com/Acme/Weather/",
        ]
        .into_iter()
        .map(|url| install_key(&github_payload(url)))
        .collect();

        assert!(keys.iter().all(|key| key == "github:acme/weather"), "{keys:?}");
    }

    #[test]
    fn test_github_update_matches_install_key() {
        let target = UpdateTarget::GitHub {
            installation_id: "inst-g".to_string(),
            repo: "https://github.com/acme/weather.git".to_string(),
            version: "v1.1.0".to_string(),
            package: "weather.json".to_string(),
        };
        assert_eq!(
            update_key(&target),
            install_key(&github_payload("acme/weather"))
        );
    }

    #[test]
    fn test_other_sources_keys() {
        let identity = PluginIdentity::new("acme", "search", "1.0.0");
        let marketplace = InstallPayload::Marketplace {
            identifier: UniqueIdentifier::new(&identity, None),
        };
        assert_eq!(install_key(&marketplace), "acme/search");

        let target = UpdateTarget::Marketplace {
            installation_id: "inst-m".to_string(),
            identity,
            target_version: "2.0.0".to_string(),
        };
        assert_eq!(update_key(&target), "acme/search");

        let local = InstallPayload::Local {
            file: PathBuf::from("weather.json"),
        };
        assert_eq!(install_key(&local), "file:weather.json");
    }
}
