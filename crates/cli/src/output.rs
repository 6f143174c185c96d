//! Terminal output formatting with rich UI support.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use plugbay_core::{InstallSource, InstalledPluginRecord, PluginTask, TaskStatus};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

// ============================================================================
// Spinners
// ============================================================================

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Creates a spinner for a pending request.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style("{spinner:.cyan} {msg}"));
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Finishes a spinner with success.
pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.set_style(spinner_style("{msg}"));
    spinner.finish_with_message(format!("{} {}", style("✓").green(), message));
}

/// Finishes a spinner with failure.
pub fn spinner_failure(spinner: &ProgressBar, message: &str) {
    spinner.set_style(spinner_style("{msg}"));
    spinner.finish_with_message(format!("{} {}", style("✗").red(), message));
}

/// Finishes a spinner without a verdict.
pub fn spinner_skipped(spinner: &ProgressBar, message: &str) {
    spinner.set_style(spinner_style("{msg}"));
    spinner.finish_with_message(format!("{} {}", style("○").dim(), style(message).dim()));
}

// ============================================================================
// Plugins and tasks
// ============================================================================

fn source_label(source: InstallSource) -> console::StyledObject<&'static str> {
    match source {
        InstallSource::Marketplace => style("marketplace").magenta(),
        InstallSource::GitHub => style("github").blue(),
        InstallSource::Local => style("local").dim(),
        InstallSource::Debugging => style("debugging").yellow(),
    }
}

/// Prints one installed plugin.
pub fn plugin_row(record: &InstalledPluginRecord, detailed: bool) {
    print!(
        "  {} {} {} {}",
        style(record.plugin_id()).cyan().bold(),
        record.version(),
        style(format!("[{}]", record.category)).dim(),
        source_label(record.source)
    );
    if record.has_new_version() {
        if let Some(latest) = &record.latest_version {
            print!(" {}", style(format!("(update available: {latest})")).yellow());
        }
    }
    println!();

    if detailed {
        key_value("Installation", &record.installation_id);
        key_value("Identifier", &record.unique_identifier);
        if !record.tags.is_empty() {
            key_value("Tags", &record.tags.join(", "));
        }
        if record.endpoints_active > 0 {
            key_value("Endpoints", &record.endpoints_active.to_string());
        }
        if let Some(meta) = &record.meta {
            key_value("Repository", &format!("{} ({}, {})", meta.repo, meta.version, meta.package));
        }
        println!();
    }
}

/// Prints one task line.
pub fn task_row(task: &PluginTask) {
    let status = match task.status {
        TaskStatus::Running => style(task.status.to_string()).yellow(),
        TaskStatus::Success => style(task.status.to_string()).green(),
        TaskStatus::Failed => style(task.status.to_string()).red(),
    };
    println!(
        "  {} {} {}/{}",
        style(&task.id).bold(),
        status,
        task.completed_plugins,
        task.total_plugins
    );
}

/// Prints a header for a section.
pub fn section_header(title: &str) {
    println!("\n{}", style(format!("── {} ──", title)).bold());
}

/// Prints a key-value pair.
pub fn key_value(key: &str, value: &str) {
    println!("    {}: {}", style(key).dim(), value);
}
