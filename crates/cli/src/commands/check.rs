//! Check command implementation.

use miette::{Result, miette};

use super::Context;
use crate::output;

/// Checks a GitHub-sourced plugin for a newer release.
pub async fn execute(ctx: &Context, id: &str) -> Result<()> {
    let record = ctx.manager.find(id).await.map_err(|e| miette!("{}", e))?;

    let spinner = output::create_spinner(&format!("Checking releases of {}...", record.plugin_id()));
    let result = ctx.manager.check_for_update(id).await;

    match result {
        Ok(Some(release)) => {
            output::spinner_success(
                &spinner,
                &format!(
                    "{} {} → {} available",
                    record.plugin_id(),
                    record.version(),
                    release.tag_name
                ),
            );
            output::info(&format!("Run 'plugbay update {}' to upgrade", record.plugin_id()));
        }
        Ok(None) => output::spinner_skipped(
            &spinner,
            &format!("{} {} is up to date", record.plugin_id(), record.version()),
        ),
        Err(e) => {
            output::spinner_failure(&spinner, "Release check failed");
            return Err(miette!("{}", e));
        }
    }

    Ok(())
}
