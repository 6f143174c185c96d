//! Uninstall command implementation.

use miette::{Result, miette};

use super::Context;
use crate::output;

/// Removes an installation by plugin id or installation id.
pub async fn execute(ctx: &Context, id: &str) -> Result<()> {
    let record = ctx.manager.find(id).await.map_err(|e| miette!("{}", e))?;

    let removed = ctx
        .manager
        .uninstall(&record.installation_id)
        .await
        .map_err(|e| miette!("Uninstall failed: {}", e))?;

    if !removed {
        return Err(miette!(
            "The platform refused to uninstall {}",
            record.plugin_id()
        ));
    }

    output::success(&format!("Uninstalled {}", record.plugin_id()));
    Ok(())
}
