//! CLI command implementations.

pub mod check;
pub mod init;
pub mod install;
pub mod list;
pub mod tasks;
pub mod uninstall;
pub mod update;

use std::path::Path;
use std::sync::Arc;

use miette::{Result, miette};
use plugbay_engine::{FilePlatform, PluginManager, ReleaseFetcher};
use plugbay_github::GitHubReleases;

use crate::config::Config;

/// Everything a command needs from an opened workspace.
pub struct Context {
    pub platform: Arc<FilePlatform>,
    pub manager: PluginManager,
}

impl Context {
    /// Opens the platform in `workspace` and wires the GitHub fetcher from `config`.
    pub fn open(workspace: &Path, config: &Config) -> Result<Self> {
        let releases: Arc<dyn ReleaseFetcher> = Arc::new(
            GitHubReleases::new(config.client_options())
                .map_err(|e| miette!("Failed to set up GitHub client: {}", e))?,
        );

        let platform = Arc::new(
            FilePlatform::open(workspace)
                .map_err(|e| miette!("Failed to open workspace {}: {}", workspace.display(), e))?
                .with_release_fetcher(Arc::clone(&releases)),
        );
        let manager = PluginManager::for_platform(Arc::clone(&platform)).with_release_fetcher(releases);

        tracing::debug!(workspace = %workspace.display(), "workspace opened");

        Ok(Self {
            platform,
            manager,
        })
    }
}
