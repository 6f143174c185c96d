//! Update command implementation.

use miette::{Result, miette};
use plugbay_core::{
    InstallSource, InstalledPluginRecord, PluginDeclaration, UpdateStep, is_newer, latest_version,
};

use super::Context;
use crate::output;

/// Returns the newest catalog version of `record` if it is newer than the installed one.
fn newer_in_catalog(catalog: &[PluginDeclaration], record: &InstalledPluginRecord) -> Option<String> {
    let versions = catalog
        .iter()
        .filter(|d| d.identity().plugin_id() == record.plugin_id())
        .map(|d| d.version.as_str());

    latest_version(versions)
        .ok()
        .filter(|latest| is_newer(latest, record.version()))
}

/// Updates a plugin to `version`, or to the newest available one.
pub async fn execute(ctx: &Context, id: &str, version: Option<String>) -> Result<()> {
    let record = ctx.manager.find(id).await.map_err(|e| miette!("{}", e))?;

    let target = match (version, record.source) {
        (Some(version), _) => Some(version),
        (None, InstallSource::Marketplace) => newer_in_catalog(ctx.platform.catalog(), &record),
        (None, InstallSource::GitHub) => ctx
            .manager
            .check_for_update(id)
            .await
            .map_err(|e| miette!("Release check failed: {}", e))?
            .map(|release| release.tag_name),
        (None, source) => {
            return Err(miette!("{} installs cannot be updated in place", source));
        }
    };

    let Some(target) = target else {
        output::info(&format!(
            "{} {} is up to date",
            record.plugin_id(),
            record.version()
        ));
        return Ok(());
    };

    let mut session = ctx
        .manager
        .start_update(&record, target.clone())
        .map_err(|e| miette!("{}", e))?;

    let spinner = output::create_spinner(&format!(
        "Updating {} {} → {}...",
        record.plugin_id(),
        record.version(),
        target
    ));
    let step = session.confirm_update().await.map_err(|e| miette!("{}", e))?;

    if step == UpdateStep::Installed {
        output::spinner_success(&spinner, &format!("Updated {} to {}", record.plugin_id(), target));
        Ok(())
    } else {
        output::spinner_failure(&spinner, "Update failed");
        Err(miette!(
            "{}",
            session.error_message().unwrap_or("update failed")
        ))
    }
}
