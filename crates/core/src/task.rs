//! Background install tasks reported by the platform.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a task or of one plugin inside a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Success,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome for one plugin within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginTaskStatus {
    pub unique_identifier: String,
    pub plugin_id: String,
    pub status: TaskStatus,

    /// Message from the platform, usually empty on success.
    #[serde(default)]
    pub message: String,
}

/// A bulk or background install job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginTask {
    pub id: String,
    pub status: TaskStatus,
    pub total_plugins: usize,
    pub completed_plugins: usize,

    #[serde(default)]
    pub plugins: Vec<PluginTaskStatus>,

    /// Creation time in seconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
}

impl PluginTask {
    /// Returns true once the task stopped running.
    pub fn is_finished(&self) -> bool {
        self.status != TaskStatus::Running
    }

    /// Returns the status entry for a plugin artifact.
    pub fn plugin(&self, unique_identifier: &str) -> Option<&PluginTaskStatus> {
        self.plugins
            .iter()
            .find(|plugin| plugin.unique_identifier == unique_identifier)
    }
}
