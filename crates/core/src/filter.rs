//! Filtering of the installed plugin list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::InstalledPluginRecord;
use crate::source::PluginCategory;

/// Criteria selected in the installed-plugin view.
///
/// Empty sets and an empty query do not filter anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub categories: BTreeSet<PluginCategory>,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Case-insensitive substring of the plugin id.
    #[serde(default)]
    pub search_query: String,
}

impl FilterCriteria {
    /// Creates criteria that match everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category.
    pub fn with_category(mut self, category: PluginCategory) -> Self {
        self.categories.insert(category);
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Sets the search query.
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty() && self.search_query.is_empty()
    }

    /// Returns true if the record passes all three predicates.
    pub fn matches(&self, record: &InstalledPluginRecord) -> bool {
        self.matches_category(record) && self.matches_tags(record) && self.matches_query(record)
    }

    fn matches_category(&self, record: &InstalledPluginRecord) -> bool {
        self.categories.is_empty() || self.categories.contains(&record.category)
    }

    fn matches_tags(&self, record: &InstalledPluginRecord) -> bool {
        self.tags.is_empty() || record.tags.iter().any(|tag| self.tags.contains(tag))
    }

    fn matches_query(&self, record: &InstalledPluginRecord) -> bool {
        self.search_query.is_empty()
            || record
                .plugin_id()
                .to_lowercase()
                .contains(&self.search_query.to_lowercase())
    }
}

/// Returns the records matching `criteria`, in their original order.
pub fn apply_filter<'a>(
    records: &'a [InstalledPluginRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a InstalledPluginRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PluginIdentity;
    use crate::source::InstallSource;

    fn record(author: &str, name: &str, category: PluginCategory, tags: &[&str]) -> InstalledPluginRecord {
        InstalledPluginRecord::new(
            format!("inst-{name}"),
            PluginIdentity::new(author, name, "1.0.0"),
            category,
            InstallSource::Marketplace,
        )
        .with_tags(tags.iter().copied())
    }

    fn names(records: &[&InstalledPluginRecord]) -> Vec<String> {
        records.iter().map(|r| r.identity.name.clone()).collect()
    }

    #[test]
    fn test_category_filter() {
        let records = vec![
            record("", "a", PluginCategory::Tool, &["x"]),
            record("", "b", PluginCategory::Model, &["y"]),
        ];
        let criteria = FilterCriteria::new().with_category(PluginCategory::Tool);

        assert_eq!(names(&apply_filter(&records, &criteria)), vec!["a"]);
    }

    #[test]
    fn test_empty_criteria_keeps_everything_in_order() {
        let records = vec![
            record("acme", "zeta", PluginCategory::Extension, &[]),
            record("acme", "alpha", PluginCategory::Tool, &["x"]),
            record("other", "mid", PluginCategory::Model, &["y"]),
        ];
        let criteria = FilterCriteria::new();
        assert!(criteria.is_empty());

        let filtered = apply_filter(&records, &criteria);
        assert_eq!(filtered.len(), records.len());
        for (kept, original) in filtered.iter().zip(&records) {
            assert_eq!(*kept, original);
        }
    }

    #[test]
    fn test_tags_match_any() {
        let records = vec![
            record("", "a", PluginCategory::Tool, &["search", "web"]),
            record("", "b", PluginCategory::Tool, &["image"]),
            record("", "c", PluginCategory::Tool, &[]),
        ];
        let criteria = FilterCriteria::new().with_tag("web").with_tag("image");

        assert_eq!(names(&apply_filter(&records, &criteria)), vec!["a", "b"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_plugin_id() {
        let records = vec![
            record("LangGenius", "Google", PluginCategory::Tool, &[]),
            record("acme", "weather", PluginCategory::Tool, &[]),
        ];

        let criteria = FilterCriteria::new().with_search("langgenius/goo");
        assert_eq!(names(&apply_filter(&records, &criteria)), vec!["Google"]);

        let criteria = FilterCriteria::new().with_search("ACME");
        assert_eq!(names(&apply_filter(&records, &criteria)), vec!["weather"]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let records = vec![
            record("acme", "search-tool", PluginCategory::Tool, &["web"]),
            record("acme", "search-model", PluginCategory::Model, &["web"]),
            record("acme", "other-tool", PluginCategory::Tool, &["web"]),
        ];
        let criteria = FilterCriteria::new()
            .with_category(PluginCategory::Tool)
            .with_tag("web")
            .with_search("search");

        assert_eq!(names(&apply_filter(&records, &criteria)), vec!["search-tool"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            record("acme", "a", PluginCategory::Tool, &["x"]),
            record("acme", "b", PluginCategory::Model, &["x"]),
        ];
        let criteria = FilterCriteria::new().with_tag("x").with_search("acme");

        let first = names(&apply_filter(&records, &criteria));
        let second = names(&apply_filter(&records, &criteria));
        assert_eq!(first, second);
    }
}
