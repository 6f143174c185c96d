//! Checks a GitHub-sourced plugin for a newer release.

use plugbay_core::{PluginIdentity, ReleaseInfo, Result, is_newer, latest_version};

use crate::service::ReleaseFetcher;

/// Returns the newest release if it is strictly newer than `identity.version`.
///
/// Fetch failures propagate as `Network`; nothing is retried.
pub async fn check_for_update(
    fetcher: &dyn ReleaseFetcher,
    identity: &PluginIdentity,
) -> Result<Option<ReleaseInfo>> {
    let releases = fetcher
        .fetch_releases(&identity.author, &identity.name)
        .await?;

    if releases.is_empty() {
        tracing::debug!(plugin = %identity.plugin_id(), "no releases published");
        return Ok(None);
    }

    let latest = latest_version(releases.iter().map(|r| r.tag_name.as_str()))?;
    if !is_newer(&latest, &identity.version) {
        tracing::debug!(plugin = %identity.plugin_id(), latest = %latest, "up to date");
        return Ok(None);
    }

    tracing::info!(
        plugin = %identity.plugin_id(),
        installed = %identity.version,
        latest = %latest,
        "new release available"
    );
    Ok(releases.into_iter().find(|r| r.tag_name == latest))
}
