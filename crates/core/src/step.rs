//! Lifecycle steps of install and update attempts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Step of a single install attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallStep {
    /// The package is being uploaded for validation.
    Uploading,

    /// Upload was rejected. Terminal.
    UploadFailed,

    /// Package is known and waits for confirmation.
    ReadyToInstall,

    /// The install request is in flight.
    Installing,

    /// Terminal success.
    Installed,

    /// The platform rejected the install. Terminal.
    #[serde(rename = "failed")]
    InstallFailed,

    /// The attempt was abandoned before finishing. Terminal.
    Cancelled,
}

impl InstallStep {
    /// Returns true if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::UploadFailed | Self::Installed | Self::InstallFailed | Self::Cancelled
        )
    }

    /// Returns true if the step is a terminal failure.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::UploadFailed | Self::InstallFailed)
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uploading => "uploading",
            Self::UploadFailed => "upload failed",
            Self::ReadyToInstall => "ready to install",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::InstallFailed => "install failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Step of an in-place version update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateStep {
    NotStarted,
    Upgrading,
    Installed,
    UpdateFailed,
    Cancelled,
}

impl UpdateStep {
    /// Returns true if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Installed | Self::UpdateFailed | Self::Cancelled)
    }
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::Upgrading => "upgrading",
            Self::Installed => "installed",
            Self::UpdateFailed => "update failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
