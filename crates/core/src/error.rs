//! Error types for Plugbay.

use thiserror::Error;

/// Result type alias for Plugbay operations.
pub type Result<T> = std::result::Result<T, PlugbayError>;

/// Main error type for Plugbay.
#[derive(Debug, Error)]
pub enum PlugbayError {
    /// Input to an install does not match its source or is incomplete.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A collaborator call failed at the transport level.
    #[error("Network error: {0}")]
    Network(String),

    #[error("No versions to compare")]
    EmptyInput,

    /// An event was applied to a step that does not accept it.
    #[error("Cannot apply '{event}' while {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Another attempt is already in progress for '{0}'")]
    AttemptInProgress(String),

    /// An error reported verbatim by the installation backend.
    #[error("{0}")]
    Service(String),

    #[error("Plugin '{0}' not found")]
    NotFound(String),

    #[error("Invalid plugin manifest: {0}")]
    Manifest(String),

    #[error("Parse error: {message}")]
    Parse { message: String, offset: Option<usize> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlugbayError {
    /// Creates an invalid transition error from a step and an event.
    pub fn invalid_transition(from: impl std::fmt::Display, event: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            event: event.to_string(),
        }
    }
}
