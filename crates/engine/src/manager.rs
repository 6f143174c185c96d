//! Application-level plugin state.

use std::sync::Arc;

use plugbay_core::{
    FilterCriteria, InstallPayload, InstallSource, InstalledPluginRecord, PlugbayError,
    PluginIdentity, ReleaseInfo, Result, UpdateTarget, apply_filter,
};

use crate::attempt::{AttemptSet, install_key, update_key};
use crate::checker;
use crate::install::InstallSession;
use crate::service::{InstallService, PluginRegistry, ReleaseFetcher};
use crate::snapshot::InstalledSnapshot;
use crate::update::UpdateSession;

/// Owns the collaborators, the installed snapshot and the in-flight attempts.
///
/// Sessions started here hold an attempt guard and invalidate the snapshot
/// when they succeed.
pub struct PluginManager {
    service: Arc<dyn InstallService>,
    registry: Arc<dyn PluginRegistry>,
    releases: Option<Arc<dyn ReleaseFetcher>>,
    snapshot: InstalledSnapshot,
    attempts: AttemptSet,
}

impl PluginManager {
    /// Creates a manager without a release fetcher.
    pub fn new(service: Arc<dyn InstallService>, registry: Arc<dyn PluginRegistry>) -> Self {
        Self {
            service,
            registry,
            releases: None,
            snapshot: InstalledSnapshot::new(),
            attempts: AttemptSet::new(),
        }
    }

    /// Creates a manager over one platform serving both roles.
    pub fn for_platform<P>(platform: Arc<P>) -> Self
    where
        P: InstallService + PluginRegistry + 'static,
    {
        Self::new(platform.clone(), platform)
    }

    /// Sets the fetcher used by update checks.
    pub fn with_release_fetcher(mut self, releases: Arc<dyn ReleaseFetcher>) -> Self {
        self.releases = Some(releases);
        self
    }

    pub fn snapshot(&self) -> &InstalledSnapshot {
        &self.snapshot
    }

    /// Returns the installed plugins, reading through the snapshot.
    pub async fn installed(&self) -> Result<Arc<[InstalledPluginRecord]>> {
        self.snapshot.get(self.registry.as_ref()).await
    }

    /// Returns the installed plugins matching `criteria`, in registry order.
    pub async fn filtered(&self, criteria: &FilterCriteria) -> Result<Vec<InstalledPluginRecord>> {
        let installed = self.installed().await?;
        Ok(apply_filter(&installed, criteria)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Finds an installation by plugin id or installation id.
    pub async fn find(&self, id: &str) -> Result<InstalledPluginRecord> {
        self.installed()
            .await?
            .iter()
            .find(|record| record.plugin_id() == id || record.installation_id == id)
            .cloned()
            .ok_or_else(|| PlugbayError::NotFound(id.to_string()))
    }

    /// Starts an install attempt.
    ///
    /// Fails with `AttemptInProgress` while another attempt holds the same key.
    pub fn start_install(
        &self,
        source: InstallSource,
        payload: InstallPayload,
    ) -> Result<InstallSession> {
        let key = install_key(&payload);
        let session = InstallSession::start(Arc::clone(&self.service), source, payload)?;
        let guard = self.attempts.acquire(key)?;

        Ok(session
            .with_guard(guard)
            .with_snapshot(self.snapshot.clone()))
    }

    /// Starts an update of `record` to `target_version`.
    pub fn start_update(
        &self,
        record: &InstalledPluginRecord,
        target_version: impl Into<String>,
    ) -> Result<UpdateSession> {
        let target = update_target(record, target_version.into())?;
        let key = update_key(&target);
        let session = UpdateSession::start(Arc::clone(&self.service), target)?;
        let guard = self.attempts.acquire(key)?;

        Ok(session
            .with_guard(guard)
            .with_snapshot(self.snapshot.clone()))
    }

    /// Checks a GitHub-sourced plugin for a newer release.
    pub async fn check_for_update(&self, id: &str) -> Result<Option<ReleaseInfo>> {
        let record = self.find(id).await?;
        if record.source != InstallSource::GitHub {
            return Err(PlugbayError::InvalidPayload(format!(
                "'{}' was installed from {}; only GitHub installs are checked for releases",
                record.plugin_id(),
                record.source
            )));
        }

        let releases = self
            .releases
            .as_deref()
            .ok_or_else(|| PlugbayError::Service("no release fetcher configured".to_string()))?;

        checker::check_for_update(releases, &release_identity(&record)).await
    }

    /// Removes an installation. Returns false if the platform refused.
    pub async fn uninstall(&self, installation_id: &str) -> Result<bool> {
        let response = self.service.uninstall(installation_id).await?;

        if response.success {
            tracing::info!(installation = installation_id, "plugin uninstalled");
            self.snapshot.invalidate();
        } else {
            tracing::warn!(installation = installation_id, "uninstall refused");
        }
        Ok(response.success)
    }

    /// Forces the next read to refetch the installed list.
    pub fn invalidate(&self) {
        self.snapshot.invalidate();
    }
}

fn update_target(record: &InstalledPluginRecord, target_version: String) -> Result<UpdateTarget> {
    match record.source {
        InstallSource::Marketplace => Ok(UpdateTarget::Marketplace {
            installation_id: record.installation_id.clone(),
            identity: record.identity.clone(),
            target_version,
        }),
        InstallSource::GitHub => {
            let meta = record.meta.as_ref().ok_or_else(|| {
                PlugbayError::InvalidPayload(format!(
                    "'{}' has no repository metadata",
                    record.plugin_id()
                ))
            })?;

            Ok(UpdateTarget::GitHub {
                installation_id: record.installation_id.clone(),
                repo: meta.repo.clone(),
                version: target_version,
                package: meta.package.clone(),
            })
        }
        InstallSource::Local | InstallSource::Debugging => Err(PlugbayError::InvalidPayload(
            format!("{} installs cannot be updated in place", record.source),
        )),
    }
}

/// Identity to query releases with: the repository when known.
fn release_identity(record: &InstalledPluginRecord) -> PluginIdentity {
    record
        .meta
        .as_ref()
        .and_then(|meta| plugbay_parser::parse_github_url(&meta.repo).ok())
        .map(|repo| PluginIdentity::new(repo.owner, repo.repo, record.version()))
        .unwrap_or_else(|| record.identity.clone())
}
