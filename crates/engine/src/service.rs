//! Collaborators the lifecycle engine talks to.
//!
//! The platform owns installation and the registry of installed plugins;
//! releases come from the repository host. Both sit behind these traits so
//! the state machines can be driven against real services, the file-backed
//! platform, or test doubles.

use async_trait::async_trait;
use plugbay_core::{
    InstallPayload, InstalledPluginRecord, PluginIdentity, PluginTask, PreparedPackage,
    ReleaseAsset, ReleaseInfo, Result,
};

/// Response to a package upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub success: bool,

    /// The validated package, present on success.
    pub package: Option<PreparedPackage>,

    pub error_message: Option<String>,
}

impl UploadResponse {
    pub fn accepted(package: PreparedPackage) -> Self {
        Self {
            success: true,
            package: Some(package),
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            package: None,
            error_message: Some(message.into()),
        }
    }
}

/// Response to an install request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallResponse {
    pub success: bool,

    /// Background task tracking the install, if the platform created one.
    pub task_id: Option<String>,

    pub error_message: Option<String>,
}

impl InstallResponse {
    pub fn succeeded(task_id: Option<String>) -> Self {
        Self {
            success: true,
            task_id,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            task_id: None,
            error_message: Some(message.into()),
        }
    }
}

/// Response to an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResponse {
    pub success: bool,
    pub error_message: Option<String>,
}

impl UpdateResponse {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Response to an uninstall request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallResponse {
    pub success: bool,
}

/// Fetches releases published for a plugin repository.
#[async_trait]
pub trait ReleaseFetcher: Send + Sync {
    /// Lists releases for `author/name`. Fails with `Network` on transport errors.
    async fn fetch_releases(&self, author: &str, name: &str) -> Result<Vec<ReleaseInfo>>;

    /// Downloads the content of a release asset.
    async fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>>;
}

/// The platform's installation service.
///
/// `Err` results mean the request did not reach the platform; rejections by
/// the platform come back as responses with `success == false`.
#[async_trait]
pub trait InstallService: Send + Sync {
    /// Uploads a file-bearing payload for validation.
    async fn upload_package(&self, payload: &InstallPayload) -> Result<UploadResponse>;

    /// Installs the artifact named by `payload`.
    ///
    /// `package` is the upload result for file-bearing sources and `None`
    /// for marketplace and debugging installs.
    async fn install_from_source(
        &self,
        payload: &InstallPayload,
        package: Option<&PreparedPackage>,
    ) -> Result<InstallResponse>;

    /// Moves a marketplace installation to another published version.
    async fn update_from_marketplace(
        &self,
        installation_id: &str,
        identity: &PluginIdentity,
        target_version: &str,
    ) -> Result<UpdateResponse>;

    /// Reinstalls a GitHub installation from another release.
    async fn update_from_github(
        &self,
        installation_id: &str,
        repo: &str,
        version: &str,
        package: &str,
    ) -> Result<UpdateResponse>;

    /// Removes an installation.
    async fn uninstall(&self, installation_id: &str) -> Result<UninstallResponse>;
}

/// The platform's registry of installed plugins.
#[async_trait]
pub trait PluginRegistry: Send + Sync {
    async fn list_installed(&self) -> Result<Vec<InstalledPluginRecord>>;
}

/// Source of background task status, polled by the caller.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_task(&self, task_id: &str) -> Result<PluginTask>;

    async fn list_tasks(&self) -> Result<Vec<PluginTask>>;
}
