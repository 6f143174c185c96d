//! List command implementation.

use console::style;
use miette::{Result, miette};
use plugbay_core::{FilterCriteria, InstalledPluginRecord, PluginCategory, apply_filter};

use super::Context;
use crate::output;

/// What `list` shows for a snapshot and a filter.
#[derive(Debug, PartialEq)]
enum Listing<'a> {
    NothingInstalled,
    NoMatches,
    Plugins(Vec<&'a InstalledPluginRecord>),
}

fn listing<'a>(installed: &'a [InstalledPluginRecord], criteria: &FilterCriteria) -> Listing<'a> {
    if installed.is_empty() {
        return Listing::NothingInstalled;
    }

    let matches = apply_filter(installed, criteria);
    if matches.is_empty() {
        Listing::NoMatches
    } else {
        Listing::Plugins(matches)
    }
}

/// Lists installed plugins matching the given filters.
pub async fn execute(
    ctx: &Context,
    categories: Vec<PluginCategory>,
    tags: Vec<String>,
    search: Option<String>,
    detailed: bool,
) -> Result<()> {
    let mut criteria = categories
        .into_iter()
        .fold(FilterCriteria::new(), FilterCriteria::with_category);
    criteria = tags.into_iter().fold(criteria, |c, tag| c.with_tag(tag));
    if let Some(query) = search {
        criteria = criteria.with_search(query);
    }

    let installed = ctx
        .manager
        .installed()
        .await
        .map_err(|e| miette!("Failed to read installed plugins: {}", e))?;

    match listing(&installed, &criteria) {
        Listing::NothingInstalled => output::info("No plugins installed"),
        Listing::NoMatches => output::info("No plugins found"),
        Listing::Plugins(plugins) => {
            println!("{}", style("Installed plugins:").bold());
            println!();
            for record in plugins {
                output::plugin_row(record, detailed);
            }
        }
    }

    Ok(())
}
