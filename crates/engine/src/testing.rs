//! Test doubles shared by the engine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use plugbay_core::{
    InstallPayload, InstallSource, InstalledPluginRecord, PlugbayError, PluginCategory,
    PluginDeclaration, PluginIdentity, PreparedPackage, ReleaseAsset, ReleaseInfo, Result,
};

use crate::service::{
    InstallResponse, InstallService, PluginRegistry, ReleaseFetcher, UninstallResponse,
    UpdateResponse, UploadResponse,
};

/// Install service whose answers are fixed up front.
#[derive(Default)]
pub struct ScriptedService {
    pub reject_upload: Option<&'static str>,
    pub reject_install: Option<&'static str>,
    pub reject_update: Option<&'static str>,
    pub offline: bool,
    pub installs: AtomicUsize,
    pub updates: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    fn reachable(&self) -> Result<()> {
        if self.offline {
            return Err(PlugbayError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

pub fn weather_package() -> PreparedPackage {
    let identity = PluginIdentity::new("acme", "weather", "1.0.0");
    PreparedPackage::new(
        "acme/weather:1.0.0@abc123",
        PluginDeclaration::new(&identity, PluginCategory::Tool),
    )
}

#[async_trait]
impl InstallService for ScriptedService {
    async fn upload_package(&self, _payload: &InstallPayload) -> Result<UploadResponse> {
        self.reachable()?;
        Ok(match self.reject_upload {
            Some(message) => UploadResponse::rejected(message),
            None => UploadResponse::accepted(weather_package()),
        })
    }

    async fn install_from_source(
        &self,
        _payload: &InstallPayload,
        _package: Option<&PreparedPackage>,
    ) -> Result<InstallResponse> {
        self.reachable()?;
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(match self.reject_install {
            Some(message) => InstallResponse::failed(message),
            None => InstallResponse::succeeded(Some("task-1".to_string())),
        })
    }

    async fn update_from_marketplace(
        &self,
        installation_id: &str,
        _identity: &PluginIdentity,
        target_version: &str,
    ) -> Result<UpdateResponse> {
        self.reachable()?;
        self.record_update(installation_id, target_version)
    }

    async fn update_from_github(
        &self,
        installation_id: &str,
        _repo: &str,
        version: &str,
        _package: &str,
    ) -> Result<UpdateResponse> {
        self.reachable()?;
        self.record_update(installation_id, version)
    }

    async fn uninstall(&self, _installation_id: &str) -> Result<UninstallResponse> {
        self.reachable()?;
        Ok(UninstallResponse { success: true })
    }
}

impl ScriptedService {
    fn record_update(&self, installation_id: &str, version: &str) -> Result<UpdateResponse> {
        self.updates
            .lock()
            .unwrap()
            .push(format!("{installation_id}@{version}"));
        Ok(match self.reject_update {
            Some(message) => UpdateResponse::failed(message),
            None => UpdateResponse::succeeded(),
        })
    }
}

/// Registry serving a fixed list and counting reads.
#[derive(Default)]
pub struct StaticRegistry {
    pub records: Vec<InstalledPluginRecord>,
    pub reads: AtomicUsize,
}

impl StaticRegistry {
    pub fn with_records(records: Vec<InstalledPluginRecord>) -> Self {
        Self {
            records,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginRegistry for StaticRegistry {
    async fn list_installed(&self) -> Result<Vec<InstalledPluginRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Release fetcher returning fixed tags, or failing when `None`.
pub struct StaticReleases {
    pub tags: Option<Vec<&'static str>>,
}

impl StaticReleases {
    pub fn tags(tags: &[&'static str]) -> Self {
        Self {
            tags: Some(tags.to_vec()),
        }
    }

    pub fn unreachable() -> Self {
        Self { tags: None }
    }
}

#[async_trait]
impl ReleaseFetcher for StaticReleases {
    async fn fetch_releases(&self, _author: &str, name: &str) -> Result<Vec<ReleaseInfo>> {
        let tags = self
            .tags
            .as_ref()
            .ok_or_else(|| PlugbayError::Network("release host unreachable".to_string()))?;

        Ok(tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                ReleaseInfo::new(*tag).with_asset(
                    i as u64,
                    format!("{name}.json"),
                    format!("https://example.invalid/{tag}/{name}.json"),
                )
            })
            .collect())
    }

    async fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>> {
        Err(PlugbayError::Network(format!(
            "no content for {}",
            asset.download_url
        )))
    }
}

pub fn github_record(installation_id: &str, version: &str) -> InstalledPluginRecord {
    InstalledPluginRecord::new(
        installation_id,
        PluginIdentity::new("acme", "weather", version),
        PluginCategory::Tool,
        InstallSource::GitHub,
    )
}
