//! Tasks command implementation.

use miette::{Result, miette};
use plugbay_engine::{TaskSource, TaskTracker};

use super::Context;
use crate::output;

/// Lists recorded install tasks with their failures.
pub async fn execute(ctx: &Context) -> Result<()> {
    let tasks = ctx
        .platform
        .list_tasks()
        .await
        .map_err(|e| miette!("Failed to read tasks: {}", e))?;

    if tasks.is_empty() {
        output::info("No tasks recorded");
        return Ok(());
    }

    let mut tracker = TaskTracker::new();
    let ids: Vec<String> = tasks.iter().map(|task| task.id.clone()).collect();
    for task in tasks {
        tracker.observe(task);
    }

    output::section_header("Tasks");
    for id in &ids {
        let Some(task) = tracker.get(id) else {
            continue;
        };
        output::task_row(task);

        for failure in tracker.failures(id) {
            output::key_value(&failure.plugin_id, &failure.message);
        }
    }

    let running = tracker.running();
    if !running.is_empty() {
        output::warning(&format!("{} task(s) still running", running.len()));
    }

    Ok(())
}
