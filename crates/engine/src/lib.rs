//! Plugbay Engine - Install and update lifecycle for plugins.

mod attempt;
mod checker;
mod install;
mod manager;
mod platform;
mod service;
mod snapshot;
mod task;
mod update;

#[cfg(test)]
mod testing;

pub use attempt::{AttemptGuard, AttemptSet, install_key, update_key};
pub use checker::check_for_update;
pub use install::{InstallEvent, InstallSession, InstallState, validate_payload};
pub use manager::PluginManager;
pub use platform::{CATALOG_FILE, FilePlatform, STATE_FILE};
pub use service::{
    InstallResponse, InstallService, PluginRegistry, ReleaseFetcher, TaskSource,
    UninstallResponse, UpdateResponse, UploadResponse,
};
pub use snapshot::InstalledSnapshot;
pub use task::TaskTracker;
pub use update::{UpdateEvent, UpdateSession, UpdateState};
