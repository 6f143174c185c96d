//! Layered configuration: built-in defaults, then the user config, then the
//! workspace `config.toml`. Later layers override individual keys.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::{IntoDiagnostic, Result, WrapErr};
use plugbay_github::ClientOptions;
use serde::{Deserialize, Serialize};

/// Config file name in both the user and the workspace directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Defaults, also written by `plugbay init`.
pub const DEFAULT_CONFIG: &str = r#"# Plugbay configuration

[github]
api_base = "https://api.github.com"
# Environment variable holding a GitHub token
token_env = "GITHUB_TOKEN"
timeout_secs = 30

[log]
# Overridden by PLUGBAY_LOG
filter = "warn"
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub github: GitHubConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

impl Config {
    /// Loads the defaults merged with the user and workspace files.
    pub fn load(workspace_dir: Option<&Path>) -> Result<Self> {
        let user = user_config_path();
        let workspace = workspace_dir.map(|dir| dir.join(CONFIG_FILE));
        Self::load_from(user.as_deref(), workspace.as_deref())
    }

    /// Loads the defaults merged with the given files. Missing files are skipped.
    pub fn load_from(user: Option<&Path>, workspace: Option<&Path>) -> Result<Self> {
        let mut merged: toml::Table = DEFAULT_CONFIG
            .parse()
            .into_diagnostic()
            .wrap_err("Invalid built-in configuration")?;

        for path in [user, workspace].into_iter().flatten() {
            if !path.is_file() {
                continue;
            }

            let content = fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            let layer: toml::Table = content
                .parse()
                .into_diagnostic()
                .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))?;

            tracing::debug!(path = %path.display(), "config layer loaded");
            merge(&mut merged, layer);
        }

        toml::Value::Table(merged)
            .try_into::<Config>()
            .into_diagnostic()
            .wrap_err("Invalid configuration")
    }

    /// Returns the GitHub token from the configured environment variable.
    pub fn github_token(&self) -> Option<String> {
        std::env::var(&self.github.token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }

    /// Returns the HTTP client settings for the GitHub fetcher.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_base: self.github.api_base.clone(),
            token: self.github_token(),
            timeout: Duration::from_secs(self.github.timeout_secs),
            ..Default::default()
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("plugbay").join(CONFIG_FILE))
}

/// Merges `overlay` into `base`, recursing into tables.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(table) if matches!(base.get(&key), Some(toml::Value::Table(_))) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge(existing, table);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
