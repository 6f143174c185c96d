//! Plugbay GitHub - Release lookups against the GitHub REST API.

mod releases;

pub use releases::{ClientOptions, DEFAULT_API_BASE, GitHubReleases};
