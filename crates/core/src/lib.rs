//! Plugbay Core - Data model, version comparison and filtering for plugin management.

mod declaration;
mod error;
pub mod filter;
mod identity;
mod payload;
mod record;
mod release;
mod source;
mod step;
mod task;
pub mod version;

pub use declaration::PluginDeclaration;
pub use error::{PlugbayError, Result};
pub use filter::{FilterCriteria, apply_filter};
pub use identity::{GitHubRepo, PluginIdentity, UniqueIdentifier};
pub use payload::{DebugInfo, InstallPayload, PreparedPackage, UpdateTarget};
pub use record::{InstalledPluginRecord, VcsMeta};
pub use release::{ReleaseAsset, ReleaseInfo};
pub use source::{InstallSource, PluginCategory};
pub use step::{InstallStep, UpdateStep};
pub use task::{PluginTask, PluginTaskStatus, TaskStatus};
pub use version::{compare_version, is_newer, latest_version, version_sign};
