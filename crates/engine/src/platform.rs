//! File-backed installation platform.
//!
//! Keeps installed records, uploaded packages and tasks in `state.json` under
//! a workspace directory. Marketplace artifacts come from an optional
//! `marketplace.json` catalog next to it. A package file is a JSON plugin
//! declaration; its unique identifier carries the blake3 checksum of the
//! file content.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use plugbay_core::{
    InstallPayload, InstallSource, InstalledPluginRecord, PlugbayError, PluginDeclaration, PluginIdentity, PluginTask, PluginTaskStatus, PreparedPackage, Result,
    TaskStatus, UniqueIdentifier, VcsMeta,
};
use serde::{Deserialize, Serialize};

use crate::service::{
    InstallResponse, InstallService, PluginRegistry, ReleaseFetcher, TaskSource,
    UninstallResponse, UpdateResponse, UploadResponse,
};

/// Name of the state file inside the platform directory.
pub const STATE_FILE: &str = "state.json";

/// Name of the marketplace catalog inside the platform directory.
pub const CATALOG_FILE: &str = "marketplace.json";

/// Persisted platform state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlatformState {
    #[serde(default)]
    installed: Vec<InstalledPluginRecord>,

    /// Uploaded packages by unique identifier.
    #[serde(default)]
    packages: BTreeMap<String, StoredPackage>,

    #[serde(default)]
    tasks: Vec<PluginTask>,

    /// Counter feeding installation and task ids.
    #[serde(default)]
    sequence: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPackage {
    declaration: PluginDeclaration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<VcsMeta>,
}

/// Installation service, registry and task source over a directory.
pub struct FilePlatform {
    root: PathBuf,
    state: Mutex<PlatformState>,
    catalog: Vec<PluginDeclaration>,
    releases: Option<Arc<dyn ReleaseFetcher>>,
}

impl FilePlatform {
    /// Opens the platform at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }

        let state = Self::load_state(&root)?;
        let catalog = Self::load_catalog(&root)?;
        tracing::debug!(
            root = %root.display(),
            installed = state.installed.len(),
            catalog = catalog.len(),
            "platform opened"
        );

        Ok(Self {
            root,
            state: Mutex::new(state),
            catalog,
            releases: None,
        })
    }

    /// Sets the fetcher used for GitHub uploads and updates.
    pub fn with_release_fetcher(mut self, releases: Arc<dyn ReleaseFetcher>) -> Self {
        self.releases = Some(releases);
        self
    }

    /// Replaces the marketplace catalog.
    pub fn with_catalog(mut self, catalog: Vec<PluginDeclaration>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &[PluginDeclaration] {
        &self.catalog
    }

    /// Writes the current state to disk.
    pub fn flush(&self) -> Result<()> {
        self.save_state(&self.lock())
    }

    fn load_state(root: &Path) -> Result<PlatformState> {
        let path = root.join(STATE_FILE);
        if !path.exists() {
            return Ok(PlatformState::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| std::io::Error::other(e).into())
    }

    fn load_catalog(root: &Path) -> Result<Vec<PluginDeclaration>> {
        let path = root.join(CATALOG_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read(&path)?;
        serde_json::from_slice(&content).map_err(|e| PlugbayError::Manifest(e.to_string()))
    }

    fn save_state(&self, state: &PlatformState) -> Result<()> {
        let content = serde_json::to_string_pretty(state).map_err(std::io::Error::other)?;
        fs::write(self.root.join(STATE_FILE), content)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on a copy of the state and commits it once persisted.
    ///
    /// The in-memory state is left untouched if `f` or the write fails.
    fn mutate<T>(&self, f: impl FnOnce(&mut PlatformState) -> Result<T>) -> Result<T> {
        let mut state = self.lock();
        let mut next = state.clone();
        let value = f(&mut next)?;
        self.save_state(&next)?;
        *state = next;
        Ok(value)
    }

    fn find_in_catalog(&self, author: &str, name: &str, version: &str) -> Option<&PluginDeclaration> {
        self.catalog
            .iter()
            .find(|d| d.author == author && d.name == name && d.version == version)
    }

    /// Downloads `package` from release `version` of `repo_url`.
    async fn fetch_release_asset(
        &self,
        repo_url: &str,
        version: &str,
        package: &str,
    ) -> Result<(Vec<u8>, VcsMeta)> {
        let releases = self
            .releases
            .as_deref()
            .ok_or_else(|| rejected("GitHub installs are not configured"))?;
        let repo = plugbay_parser::parse_github_url(repo_url)?;

        let release = releases
            .fetch_releases(&repo.owner, &repo.repo)
            .await?
            .into_iter()
            .find(|release| release.tag_name == version)
            .ok_or_else(|| rejected(format!("release {version} not found in {}", repo.slug())))?;
        let asset = release
            .asset(package)
            .ok_or_else(|| rejected(format!("release {version} has no asset named {package}")))?;

        tracing::debug!(repo = %repo, asset = %asset.name, "downloading release asset");
        let bytes = releases.download_asset(asset).await?;

        let meta = VcsMeta {
            repo: repo.url(),
            version: version.to_string(),
            package: package.to_string(),
        };
        Ok((bytes, meta))
    }

    async fn upload(&self, payload: &InstallPayload) -> Result<PreparedPackage> {
        let (bytes, meta) = match payload {
            InstallPayload::Local { file } => (fs::read(file)?, None),
            InstallPayload::GitHub {
                repo_url,
                version,
                package,
            } => {
                let (bytes, meta) = self.fetch_release_asset(repo_url, version, package).await?;
                (bytes, Some(meta))
            }
            InstallPayload::Marketplace { .. } | InstallPayload::Debugging { .. } => {
                return Err(rejected(format!(
                    "{} installs do not upload a package",
                    payload.source()
                )));
            }
        };

        let declaration = PluginDeclaration::from_slice(&bytes)?;
        let unique_identifier = checksummed_identifier(&declaration, &bytes);

        self.mutate(|state| {
            state.packages.insert(
                unique_identifier.clone(),
                StoredPackage {
                    declaration: declaration.clone(),
                    meta,
                },
            );
            Ok(())
        })?;

        Ok(PreparedPackage::new(unique_identifier, declaration))
    }

    /// Resolves what an install payload puts into the registry.
    fn resolve(
        &self,
        payload: &InstallPayload,
        package: Option<&PreparedPackage>,
    ) -> Result<(String, StoredPackage)> {
        match payload {
            InstallPayload::Marketplace { identifier } => {
                let declaration = self
                    .find_in_catalog(&identifier.author, &identifier.name, &identifier.version)
                    .ok_or_else(|| {
                        rejected(format!("{identifier} is not published in the marketplace"))
                    })?;

                let unique_identifier = match &declaration.plugin_unique_identifier {
                    Some(published) => {
                        let published = plugbay_parser::parse_unique_identifier(published)?;
                        if !published.matches(identifier) {
                            return Err(rejected(format!(
                                "checksum mismatch: marketplace has {published}"
                            )));
                        }
                        published.to_string()
                    }
                    None => identifier.to_string(),
                };

                Ok((
                    unique_identifier,
                    StoredPackage {
                        declaration: declaration.clone(),
                        meta: None,
                    },
                ))
            }
            InstallPayload::Debugging {
                identity,
                category,
                session,
            } => {
                tracing::debug!(host = %session.host, port = session.port, "attaching debug session");
                Ok((
                    UniqueIdentifier::new(identity, None).to_string(),
                    StoredPackage {
                        declaration: PluginDeclaration::new(identity, *category),
                        meta: None,
                    },
                ))
            }
            InstallPayload::Local { .. } | InstallPayload::GitHub { .. } => {
                let package = package.ok_or_else(|| rejected("no uploaded package to install"))?;
                let stored = self
                    .lock()
                    .packages
                    .get(&package.unique_identifier)
                    .cloned()
                    .ok_or_else(|| {
                        rejected(format!("package {} was not uploaded", package.unique_identifier))
                    })?;
                Ok((package.unique_identifier.clone(), stored))
            }
        }
    }

    fn install(&self, payload: &InstallPayload, package: Option<&PreparedPackage>) -> Result<String> {
        let (unique_identifier, stored) = self.resolve(payload, package)?;
        let identity = stored.declaration.identity();
        let source = payload.source();

        self.mutate(|state| {
            let plugin_id = identity.plugin_id();
            if state.installed.iter().any(|r| r.plugin_id() == plugin_id) {
                return Err(rejected(format!("{plugin_id} is already installed")));
            }

            state.sequence += 1;
            let installation_id = short_id(&unique_identifier, state.sequence);
            let task_id = format!("task-{}", state.sequence);

            let mut record = InstalledPluginRecord::new(
                installation_id,
                identity.clone(),
                stored.declaration.category,
                source,
            )
            .with_unique_identifier(unique_identifier.clone())
            .with_tags(stored.declaration.tags.clone());
            if let Some(meta) = stored.meta.clone() {
                record = record.with_meta(meta);
            }

            state.installed.push(record);
            state.tasks.push(finished_task(&task_id, &unique_identifier, &plugin_id));
            Ok(task_id)
        })
    }

    fn replace_record(
        &self,
        installation_id: &str,
        unique_identifier: String,
        declaration: &PluginDeclaration,
        meta: Option<VcsMeta>,
    ) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .installed
                .iter_mut()
                .find(|r| r.installation_id == installation_id)
                .ok_or_else(|| rejected(format!("installation {installation_id} not found")))?;

            if record.plugin_id() != declaration.identity().plugin_id() {
                return Err(rejected(format!(
                    "package declares {}, expected {}",
                    declaration.identity().plugin_id(),
                    record.plugin_id()
                )));
            }

            record.identity = declaration.identity();
            record.unique_identifier = unique_identifier;
            record.category = declaration.category;
            record.tags = declaration.tags.clone();
            record.latest_version = None;
            if meta.is_some() {
                record.meta = meta;
            }
            Ok(())
        })
    }

    fn record(&self, installation_id: &str) -> Option<InstalledPluginRecord> {
        self.lock()
            .installed
            .iter()
            .find(|r| r.installation_id == installation_id)
            .cloned()
    }
}

#[async_trait]
impl InstallService for FilePlatform {
    async fn upload_package(&self, payload: &InstallPayload) -> Result<UploadResponse> {
        Ok(match self.upload(payload).await {
            Ok(package) => UploadResponse::accepted(package),
            Err(e) => UploadResponse::rejected(e.to_string()),
        })
    }

    async fn install_from_source(
        &self,
        payload: &InstallPayload,
        package: Option<&PreparedPackage>,
    ) -> Result<InstallResponse> {
        Ok(match self.install(payload, package) {
            Ok(task_id) => InstallResponse::succeeded(Some(task_id)),
            Err(e) => InstallResponse::failed(e.to_string()),
        })
    }

    async fn update_from_marketplace(
        &self,
        installation_id: &str,
        identity: &PluginIdentity,
        target_version: &str,
    ) -> Result<UpdateResponse> {
        let Some(declaration) = self.find_in_catalog(&identity.author, &identity.name, target_version)
        else {
            return Ok(UpdateResponse::failed(format!(
                "{} {target_version} is not published in the marketplace",
                identity.plugin_id()
            )));
        };

        let unique_identifier = declaration
            .plugin_unique_identifier
            .clone()
            .unwrap_or_else(|| UniqueIdentifier::new(&declaration.identity(), None).to_string());

        Ok(
            match self.replace_record(installation_id, unique_identifier, declaration, None) {
                Ok(()) => UpdateResponse::succeeded(),
                Err(e) => UpdateResponse::failed(e.to_string()),
            },
        )
    }

    async fn update_from_github(
        &self,
        installation_id: &str,
        repo: &str,
        version: &str,
        package: &str,
    ) -> Result<UpdateResponse> {
        match self.record(installation_id) {
            Some(record) if record.source == InstallSource::GitHub => {}
            Some(record) => {
                return Ok(UpdateResponse::failed(format!(
                    "{} was installed from {}",
                    record.plugin_id(),
                    record.source
                )));
            }
            None => {
                return Ok(UpdateResponse::failed(format!(
                    "installation {installation_id} not found"
                )));
            }
        }

        let result = async {
            let (bytes, meta) = self.fetch_release_asset(repo, version, package).await?;
            let declaration = PluginDeclaration::from_slice(&bytes)?;
            let unique_identifier = checksummed_identifier(&declaration, &bytes);
            self.replace_record(installation_id, unique_identifier, &declaration, Some(meta))
        }
        .await;

        Ok(match result {
            Ok(()) => UpdateResponse::succeeded(),
            Err(e) => UpdateResponse::failed(e.to_string()),
        })
    }

    async fn uninstall(&self, installation_id: &str) -> Result<UninstallResponse> {
        let removed = self.mutate(|state| {
            let before = state.installed.len();
            state
                .installed
                .retain(|r| r.installation_id != installation_id);
            Ok(state.installed.len() != before)
        })?;

        Ok(UninstallResponse { success: removed })
    }
}

#[async_trait]
impl PluginRegistry for FilePlatform {
    async fn list_installed(&self) -> Result<Vec<InstalledPluginRecord>> {
        Ok(self.lock().installed.clone())
    }
}

#[async_trait]
impl TaskSource for FilePlatform {
    async fn fetch_task(&self, task_id: &str) -> Result<PluginTask> {
        self.lock()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
            .ok_or_else(|| PlugbayError::NotFound(task_id.to_string()))
    }

    async fn list_tasks(&self) -> Result<Vec<PluginTask>> {
        Ok(self.lock().tasks.clone())
    }
}

fn rejected(message: impl Into<String>) -> PlugbayError {
    PlugbayError::Service(message.into())
}

fn checksummed_identifier(declaration: &PluginDeclaration, bytes: &[u8]) -> String {
    let checksum = blake3::hash(bytes).to_hex().to_string();
    UniqueIdentifier::new(&declaration.identity(), Some(checksum)).to_string()
}

fn short_id(seed: &str, sequence: u64) -> String {
    let hash = blake3::hash(format!("{seed}#{sequence}").as_bytes());
    hash.to_hex().as_str()[..12].to_string()
}

fn finished_task(task_id: &str, unique_identifier: &str, plugin_id: &str) -> PluginTask {
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    PluginTask {
        id: task_id.to_string(),
        status: TaskStatus::Success,
        total_plugins: 1,
        completed_plugins: 1,
        plugins: vec![PluginTaskStatus {
            unique_identifier: unique_identifier.to_string(),
            plugin_id: plugin_id.to_string(),
            status: TaskStatus::Success,
            message: String::new(),
        }],
        created_at,
    }
}
