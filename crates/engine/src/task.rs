//! Latest known state of background install tasks.
//!
//! The tracker never polls. Callers fetch tasks from a [`TaskSource`] on
//! their own schedule and feed them in with [`TaskTracker::observe`].
//!
//! [`TaskSource`]: crate::service::TaskSource

use std::collections::HashMap;

use plugbay_core::{PluginTask, PluginTaskStatus, TaskStatus};

/// Tasks keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TaskTracker {
    tasks: HashMap<String, PluginTask>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `task`, replacing any earlier observation of the same id.
    ///
    /// Returns true if the task finished with this observation.
    pub fn observe(&mut self, task: PluginTask) -> bool {
        let was_running = self
            .tasks
            .get(&task.id)
            .is_none_or(|previous| !previous.is_finished());
        let finished = task.is_finished();

        if finished && was_running {
            tracing::info!(
                task = %task.id,
                status = %task.status,
                completed = task.completed_plugins,
                total = task.total_plugins,
                "task finished"
            );
        }

        self.tasks.insert(task.id.clone(), task);
        finished && was_running
    }

    pub fn get(&self, task_id: &str) -> Option<&PluginTask> {
        self.tasks.get(task_id)
    }

    pub fn status(&self, task_id: &str) -> Option<TaskStatus> {
        self.get(task_id).map(|task| task.status)
    }

    /// Returns the outcome for one artifact within a task.
    pub fn plugin_outcome(
        &self,
        task_id: &str,
        unique_identifier: &str,
    ) -> Option<&PluginTaskStatus> {
        self.get(task_id)?.plugin(unique_identifier)
    }

    /// Returns true if the task is known and no longer running.
    pub fn is_finished(&self, task_id: &str) -> bool {
        self.get(task_id).is_some_and(PluginTask::is_finished)
    }

    /// Returns the plugins that failed within a task.
    pub fn failures(&self, task_id: &str) -> Vec<&PluginTaskStatus> {
        self.get(task_id)
            .map(|task| {
                task.plugins
                    .iter()
                    .filter(|plugin| plugin.status == TaskStatus::Failed)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns ids of tasks still running.
    pub fn running(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .tasks
            .values()
            .filter(|task| !task.is_finished())
            .map(|task| task.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
