//! In-place version updates of an installed plugin.

use std::fmt;
use std::sync::Arc;

use plugbay_core::{PlugbayError, Result, UpdateStep, UpdateTarget};

use crate::attempt::AttemptGuard;
use crate::service::{InstallService, UpdateResponse};
use crate::snapshot::InstalledSnapshot;

/// Input to the update transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    Confirm,
    Succeeded,
    Failed(String),
    Cancel,
}

impl fmt::Display for UpdateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Confirm => "confirm",
            Self::Succeeded => "update succeeded",
            Self::Failed(_) => "update failed",
            Self::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// Observable state of one update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateState {
    pub step: UpdateStep,
    pub error_message: Option<String>,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            step: UpdateStep::NotStarted,
            error_message: None,
        }
    }
}

impl UpdateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state after `event`, or `InvalidTransition`.
    pub fn apply(&self, event: UpdateEvent) -> Result<Self> {
        let mut next = self.clone();

        match (self.step, event) {
            (UpdateStep::NotStarted, UpdateEvent::Confirm) => next.step = UpdateStep::Upgrading,
            (UpdateStep::Upgrading, UpdateEvent::Succeeded) => next.step = UpdateStep::Installed,
            (UpdateStep::Upgrading, UpdateEvent::Failed(message)) => {
                next.step = UpdateStep::UpdateFailed;
                next.error_message = Some(message);
            }
            (step, UpdateEvent::Cancel) if !step.is_terminal() => {
                next.step = UpdateStep::Cancelled;
            }
            (step, event) => return Err(PlugbayError::invalid_transition(step, event)),
        }

        Ok(next)
    }
}

fn validate_target(target: &UpdateTarget) -> Result<()> {
    if target.installation_id().trim().is_empty() {
        return Err(PlugbayError::InvalidPayload(
            "an installation id is required".to_string(),
        ));
    }
    if target.target_version().trim().is_empty() {
        return Err(PlugbayError::InvalidPayload(
            "a target version is required".to_string(),
        ));
    }
    if let UpdateTarget::GitHub { repo, package, .. } = target {
        plugbay_parser::parse_github_url(repo)
            .map_err(|e| PlugbayError::InvalidPayload(e.to_string()))?;
        if package.trim().is_empty() {
            return Err(PlugbayError::InvalidPayload(
                "a package file name is required".to_string(),
            ));
        }
    }
    Ok(())
}

/// Drives one update attempt to a terminal step.
pub struct UpdateSession {
    service: Arc<dyn InstallService>,
    target: UpdateTarget,
    state: UpdateState,
    guard: Option<AttemptGuard>,
    snapshot: Option<InstalledSnapshot>,
}

impl UpdateSession {
    /// Validates `target` and creates a session at `NotStarted`.
    pub fn start(service: Arc<dyn InstallService>, target: UpdateTarget) -> Result<Self> {
        validate_target(&target)?;
        tracing::info!(
            installation = target.installation_id(),
            version = target.target_version(),
            "update started"
        );

        Ok(Self {
            service,
            target,
            state: UpdateState::new(),
            guard: None,
            snapshot: None,
        })
    }

    pub(crate) fn with_guard(mut self, guard: AttemptGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Invalidates `snapshot` once the update lands.
    pub fn with_snapshot(mut self, snapshot: InstalledSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn step(&self) -> UpdateStep {
        self.state.step
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    /// Issues the update request. Valid only at `NotStarted`.
    pub async fn confirm_update(&mut self) -> Result<UpdateStep> {
        self.advance(UpdateEvent::Confirm)?;

        let response = match &self.target {
            UpdateTarget::Marketplace {
                installation_id,
                identity,
                target_version,
            } => {
                self.service
                    .update_from_marketplace(installation_id, identity, target_version)
                    .await
            }
            UpdateTarget::GitHub {
                installation_id,
                repo,
                version,
                package,
            } => {
                self.service
                    .update_from_github(installation_id, repo, version, package)
                    .await
            }
        };

        let event = match response {
            Ok(UpdateResponse { success: true, .. }) => UpdateEvent::Succeeded,
            Ok(UpdateResponse { error_message, .. }) => UpdateEvent::Failed(
                error_message.unwrap_or_else(|| "update rejected".to_string()),
            ),
            Err(e) => UpdateEvent::Failed(e.to_string()),
        };

        self.advance(event)
    }

    /// Abandons the update without touching the registry.
    pub fn cancel(self) -> Result<UpdateState> {
        let state = self.state.apply(UpdateEvent::Cancel)?;
        tracing::info!(installation = self.target.installation_id(), "update cancelled");
        Ok(state)
    }

    fn advance(&mut self, event: UpdateEvent) -> Result<UpdateStep> {
        self.state = self.state.apply(event)?;
        let step = self.state.step;

        match step {
            UpdateStep::Installed => {
                tracing::info!(version = self.target.target_version(), "plugin updated");
                if let Some(snapshot) = &self.snapshot {
                    snapshot.invalidate();
                }
            }
            UpdateStep::UpdateFailed => tracing::warn!(
                error = self.error_message().unwrap_or_default(),
                "update failed"
            ),
            _ => {}
        }
        if step.is_terminal() {
            self.guard = None;
        }

        Ok(step)
    }
}
