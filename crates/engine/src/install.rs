//! Install attempts.
//!
//! [`InstallState::apply`] is the pure transition function; [`InstallSession`]
//! drives one attempt through it against an [`InstallService`].
//!
//! ```text
//! Uploading ──upload──▶ ReadyToInstall ──confirm──▶ Installing ──▶ Installed
//!     │                                                 │
//!     └──▶ UploadFailed                                 └──▶ InstallFailed
//! ```
//!
//! Marketplace and debugging installs start at `ReadyToInstall`. Any
//! non-terminal step can be cancelled.

use std::fmt;
use std::sync::Arc;

use plugbay_core::{
    InstallPayload, InstallSource, InstallStep, PlugbayError, PreparedPackage, Result,
};

use crate::attempt::{AttemptGuard, install_key};
use crate::service::InstallService;
use crate::snapshot::InstalledSnapshot;

/// Input to the install transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    UploadSucceeded,
    UploadFailed(String),
    Confirm,
    InstallSucceeded { task_id: Option<String> },
    InstallFailed(String),
    Cancel,
}

impl fmt::Display for InstallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UploadSucceeded => "upload succeeded",
            Self::UploadFailed(_) => "upload failed",
            Self::Confirm => "confirm",
            Self::InstallSucceeded { .. } => "install succeeded",
            Self::InstallFailed(_) => "install failed",
            Self::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// Observable state of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallState {
    pub step: InstallStep,

    /// Message of the last failure.
    pub error_message: Option<String>,

    /// Background task created by the platform.
    pub task_id: Option<String>,
}

impl InstallState {
    /// Returns the initial state for a source.
    pub fn new(source: InstallSource) -> Self {
        let step = if source.requires_upload() {
            InstallStep::Uploading
        } else {
            InstallStep::ReadyToInstall
        };

        Self {
            step,
            error_message: None,
            task_id: None,
        }
    }

    /// Returns the state after `event`.
    ///
    /// Pairs outside the transition table are rejected and leave `self`
    /// untouched.
    pub fn apply(&self, event: InstallEvent) -> Result<Self> {
        let mut next = self.clone();

        match (self.step, event) {
            (InstallStep::Uploading, InstallEvent::UploadSucceeded) => {
                next.step = InstallStep::ReadyToInstall;
            }
            (InstallStep::Uploading, InstallEvent::UploadFailed(message)) => {
                next.step = InstallStep::UploadFailed;
                next.error_message = Some(message);
            }
            (InstallStep::ReadyToInstall, InstallEvent::Confirm) => {
                next.step = InstallStep::Installing;
            }
            (InstallStep::Installing, InstallEvent::InstallSucceeded { task_id }) => {
                next.step = InstallStep::Installed;
                next.task_id = task_id;
            }
            (InstallStep::Installing, InstallEvent::InstallFailed(message)) => {
                next.step = InstallStep::InstallFailed;
                next.error_message = Some(message);
            }
            (step, InstallEvent::Cancel) if !step.is_terminal() => {
                next.step = InstallStep::Cancelled;
            }
            (step, event) => return Err(PlugbayError::invalid_transition(step, event)),
        }

        Ok(next)
    }
}

/// Checks that `payload` is a complete input for `source`.
pub fn validate_payload(source: InstallSource, payload: &InstallPayload) -> Result<()> {
    if payload.source() != source {
        return Err(PlugbayError::InvalidPayload(format!(
            "expected a {source} payload, got {}",
            payload.source()
        )));
    }

    match payload {
        InstallPayload::Marketplace { identifier } => {
            if identifier.author.trim().is_empty() || identifier.name.trim().is_empty() {
                return Err(invalid("marketplace installs need an author and a name"));
            }
        }
        InstallPayload::GitHub {
            repo_url,
            version,
            package,
        } => {
            plugbay_parser::parse_github_url(repo_url)
                .map_err(|e| PlugbayError::InvalidPayload(e.to_string()))?;
            if version.trim().is_empty() {
                return Err(invalid("a release version is required"));
            }
            if package.trim().is_empty() {
                return Err(invalid("a package file name is required"));
            }
        }
        InstallPayload::Local { file } => {
            if file.file_name().is_none() {
                return Err(invalid("a package file is required"));
            }
        }
        InstallPayload::Debugging {
            identity, session, ..
        } => {
            if identity.name.trim().is_empty() {
                return Err(invalid("debugging installs need a plugin name"));
            }
            if session.key.trim().is_empty() {
                return Err(invalid("debugging installs need a session key"));
            }
        }
    }

    Ok(())
}

fn invalid(message: &str) -> PlugbayError {
    PlugbayError::InvalidPayload(message.to_string())
}

/// Drives one install attempt to a terminal step.
pub struct InstallSession {
    service: Arc<dyn InstallService>,
    payload: InstallPayload,
    state: InstallState,
    package: Option<PreparedPackage>,
    guard: Option<AttemptGuard>,
    snapshot: Option<InstalledSnapshot>,
}

impl InstallSession {
    /// Validates `payload` and creates a session at its initial step.
    pub fn start(
        service: Arc<dyn InstallService>,
        source: InstallSource,
        payload: InstallPayload,
    ) -> Result<Self> {
        validate_payload(source, &payload)?;
        tracing::info!(source = %source, key = %install_key(&payload), "install started");

        Ok(Self {
            service,
            payload,
            state: InstallState::new(source),
            package: None,
            guard: None,
            snapshot: None,
        })
    }

    /// Holds `guard` until the attempt ends.
    pub(crate) fn with_guard(mut self, guard: AttemptGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Invalidates `snapshot` once the plugin is installed.
    pub fn with_snapshot(mut self, snapshot: InstalledSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn step(&self) -> InstallStep {
        self.state.step
    }

    pub fn state(&self) -> &InstallState {
        &self.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.state.task_id.as_deref()
    }

    pub fn payload(&self) -> &InstallPayload {
        &self.payload
    }

    /// The uploaded package, once the upload succeeded.
    pub fn package(&self) -> Option<&PreparedPackage> {
        self.package.as_ref()
    }

    /// Uploads the package for a file-bearing source.
    ///
    /// Rejections and transport errors end the attempt at `UploadFailed`.
    pub async fn upload(&mut self) -> Result<InstallStep> {
        if self.state.step != InstallStep::Uploading {
            return Err(PlugbayError::invalid_transition(self.state.step, "upload"));
        }

        tracing::debug!(key = %install_key(&self.payload), "uploading package");
        let event = match self.service.upload_package(&self.payload).await {
            Ok(response) => match (response.success, response.package) {
                (true, Some(package)) => {
                    tracing::info!(package = %package.unique_identifier, "package uploaded");
                    self.package = Some(package);
                    InstallEvent::UploadSucceeded
                }
                (true, None) => InstallEvent::UploadFailed("upload returned no package".into()),
                (false, _) => InstallEvent::UploadFailed(
                    response
                        .error_message
                        .unwrap_or_else(|| "upload rejected".to_string()),
                ),
            },
            Err(e) => InstallEvent::UploadFailed(e.to_string()),
        };

        self.advance(event)
    }

    /// Issues the install request. Valid only at `ReadyToInstall`.
    pub async fn confirm_install(&mut self) -> Result<InstallStep> {
        self.advance(InstallEvent::Confirm)?;

        let event = match self
            .service
            .install_from_source(&self.payload, self.package.as_ref())
            .await
        {
            Ok(response) if response.success => InstallEvent::InstallSucceeded {
                task_id: response.task_id,
            },
            Ok(response) => InstallEvent::InstallFailed(
                response
                    .error_message
                    .unwrap_or_else(|| "install rejected".to_string()),
            ),
            Err(e) => InstallEvent::InstallFailed(e.to_string()),
        };

        self.advance(event)
    }

    /// Uploads if needed, then confirms.
    pub async fn run(&mut self) -> Result<InstallStep> {
        if self.state.step == InstallStep::Uploading {
            self.upload().await?;
        }
        if self.state.step == InstallStep::ReadyToInstall {
            return self.confirm_install().await;
        }
        Ok(self.state.step)
    }

    /// Abandons the attempt without touching the registry.
    pub fn cancel(self) -> Result<InstallState> {
        let state = self.state.apply(InstallEvent::Cancel)?;
        tracing::info!(key = %install_key(&self.payload), "install cancelled");
        Ok(state)
    }

    fn advance(&mut self, event: InstallEvent) -> Result<InstallStep> {
        self.state = self.state.apply(event)?;
        let step = self.state.step;

        if step.is_failure() {
            tracing::warn!(
                step = %step,
                error = self.error_message().unwrap_or_default(),
                "install attempt failed"
            );
        }
        if step == InstallStep::Installed {
            tracing::info!(task = self.task_id().unwrap_or("-"), "plugin installed");
            if let Some(snapshot) = &self.snapshot {
                snapshot.invalidate();
            }
        }
        if step.is_terminal() {
            self.guard = None;
        }

        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use plugbay_core::{DebugInfo, PluginCategory, PluginIdentity, UniqueIdentifier};

    use super::*;
    use crate::attempt::AttemptSet;
    use crate::testing::{ScriptedService, StaticRegistry};

    fn local_payload() -> InstallPayload {
        InstallPayload::Local {
            file: PathBuf::from("weather.json"),
        }
    }

    fn marketplace_payload() -> InstallPayload {
        let identity = PluginIdentity::new("acme", "weather", "1.0.0");
        InstallPayload::Marketplace {
            identifier: UniqueIdentifier::new(&identity, None),
        }
    }

    fn github_payload(repo_url: &str) -> InstallPayload {
        InstallPayload::GitHub {
            repo_url: repo_url.to_string(),
            version: "v1.0.0".to_string(),
            package: "weather.json".to_string(),
        }
    }

    fn session(service: ScriptedService, payload: InstallPayload) -> InstallSession {
        let source = payload.source();
        InstallSession::start(Arc::new(service), source, payload).unwrap()
    }

    #[test]
    fn test_reducer_happy_path() {
        let state = InstallState::new(InstallSource::Local);
        assert_eq!(state.step, InstallStep::Uploading);

        let state = state.apply(InstallEvent::UploadSucceeded).unwrap();
        let state = state.apply(InstallEvent::Confirm).unwrap();
        let state = state
            .apply(InstallEvent::InstallSucceeded {
                task_id: Some("t1".to_string()),
            })
            .unwrap();

        assert_eq!(state.step, InstallStep::Installed);
        assert_eq!(state.task_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_reducer_rejects_out_of_order_events() {
        let state = InstallState::new(InstallSource::GitHub);

        let err = state.apply(InstallEvent::Confirm).unwrap_err();
        assert!(matches!(err, PlugbayError::InvalidTransition { .. }));
        assert_eq!(state.step, InstallStep::Uploading);

        let ready = InstallState::new(InstallSource::Marketplace);
        assert!(ready.apply(InstallEvent::UploadSucceeded).is_err());
        assert!(
            ready
                .apply(InstallEvent::InstallSucceeded { task_id: None })
                .is_err()
        );
    }

    #[test]
    fn test_reducer_terminal_steps_accept_nothing() {
        let failed = InstallState::new(InstallSource::Local)
            .apply(InstallEvent::UploadFailed("bad manifest".to_string()))
            .unwrap();
        assert_eq!(failed.step, InstallStep::UploadFailed);
        assert_eq!(failed.error_message.as_deref(), Some("bad manifest"));

        assert!(failed.apply(InstallEvent::Cancel).is_err());
        assert!(failed.apply(InstallEvent::Confirm).is_err());
    }

    #[test]
    fn test_validate_payload() {
        assert!(validate_payload(InstallSource::Local, &local_payload()).is_ok());
        assert!(validate_payload(InstallSource::Marketplace, &local_payload()).is_err());

        let ok = github_payload("https://github.com/acme/weather");
        assert!(validate_payload(InstallSource::GitHub, &ok).is_ok());

        let bad = github_payload("https://example.com/acme/weather");
        let err = validate_payload(InstallSource::GitHub, &bad).unwrap_err();
        assert!(matches!(err, PlugbayError::InvalidPayload(_)));

        let no_version = InstallPayload::GitHub {
            repo_url: "acme/weather".to_string(),
            version: " ".to_string(),
            package: "weather.json".to_string(),
        };
        assert!(validate_payload(InstallSource::GitHub, &no_version).is_err());

        let no_file = InstallPayload::Local {
            file: PathBuf::from("/"),
        };
        assert!(validate_payload(InstallSource::Local, &no_file).is_err());

        let no_key = InstallPayload::Debugging {
            identity: PluginIdentity::new("acme", "weather", "0.1.0"),
            category: PluginCategory::Tool,
            session: DebugInfo {
                key: String::new(),
                host: "localhost".to_string(),
                port: 5003,
            },
        };
        assert!(validate_payload(InstallSource::Debugging, &no_key).is_err());
    }

    #[test]
    fn test_start_steps_by_source() {
        let local = session(ScriptedService::default(), local_payload());
        assert_eq!(local.step(), InstallStep::Uploading);

        let market = session(ScriptedService::default(), marketplace_payload());
        assert_eq!(market.step(), InstallStep::ReadyToInstall);
        assert!(market.package().is_none());
    }

    #[tokio::test]
    async fn test_confirm_before_upload_is_rejected() {
        let mut session = session(ScriptedService::default(), local_payload());

        let err = session.confirm_install().await.unwrap_err();
        assert!(matches!(err, PlugbayError::InvalidTransition { .. }));
        assert_eq!(session.step(), InstallStep::Uploading);
    }

    #[tokio::test]
    async fn test_local_install_runs_to_installed() {
        let mut session = session(ScriptedService::default(), local_payload());

        assert_eq!(session.upload().await.unwrap(), InstallStep::ReadyToInstall);
        assert_eq!(
            session.package().unwrap().unique_identifier,
            "acme/weather:1.0.0@abc123"
        );

        assert_eq!(
            session.confirm_install().await.unwrap(),
            InstallStep::Installed
        );
        assert_eq!(session.task_id(), Some("task-1"));
        assert!(session.error_message().is_none());
    }

    #[tokio::test]
    async fn test_upload_rejection_is_terminal() {
        let service = ScriptedService {
            reject_upload: Some("not a plugin package"),
            ..Default::default()
        };
        let mut session = session(service, local_payload());

        assert_eq!(session.run().await.unwrap(), InstallStep::UploadFailed);
        assert_eq!(session.error_message(), Some("not a plugin package"));
        assert!(session.confirm_install().await.is_err());
    }

    #[tokio::test]
    async fn test_service_failure_surfaces_message() {
        let service = ScriptedService {
            reject_install: Some("plugin already installed"),
            ..Default::default()
        };
        let mut session = session(service, marketplace_payload());

        assert_eq!(
            session.confirm_install().await.unwrap(),
            InstallStep::InstallFailed
        );
        assert_eq!(session.error_message(), Some("plugin already installed"));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failure_step() {
        let service = ScriptedService {
            offline: true,
            ..Default::default()
        };
        let mut session = session(service, marketplace_payload());

        assert_eq!(session.run().await.unwrap(), InstallStep::InstallFailed);
        assert!(session.error_message().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_cancel_non_terminal_and_terminal() {
        let session = session(ScriptedService::default(), local_payload());
        let state = session.cancel().unwrap();
        assert_eq!(state.step, InstallStep::Cancelled);

        let service = Arc::new(ScriptedService::default());
        let mut done =
            InstallSession::start(service.clone(), InstallSource::Marketplace, marketplace_payload())
                .unwrap();
        done.run().await.unwrap();
        assert!(done.cancel().is_err());
        assert_eq!(service.installs(), 1);
    }

    #[tokio::test]
    async fn test_terminal_step_releases_guard_and_invalidates_snapshot() {
        let attempts = AttemptSet::new();
        let registry = StaticRegistry::default();
        let snapshot = InstalledSnapshot::new();
        snapshot.get(&registry).await.unwrap();

        let payload = marketplace_payload();
        let guard = attempts.acquire(install_key(&payload)).unwrap();
        let mut session = session(ScriptedService::default(), payload)
            .with_guard(guard)
            .with_snapshot(snapshot.clone());

        assert!(attempts.is_active("acme/weather"));
        session.run().await.unwrap();

        assert!(!attempts.is_active("acme/weather"));
        assert!(snapshot.cached().is_none());
    }
}
