//! Version comparison for release tags.
//!
//! Versions are dot-separated numeric segments compared as integers, so
//! `1.9.0 < 1.10.0`. Missing trailing segments count as `0` and so does any
//! segment that is not a plain number. A single leading `v` is ignored so
//! GitHub tags such as `v1.2.0` compare like `1.2.0`.

use std::cmp::Ordering;

use crate::error::{PlugbayError, Result};

/// Compares two version strings segment by segment.
///
/// Never fails: malformed segments order as `0`.
pub fn compare_version(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let len = left.len().max(right.len());

    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Returns `-1`, `0` or `1` for `a` older than, equal to or newer than `b`.
pub fn version_sign(a: &str, b: &str) -> i8 {
    compare_version(a, b) as i8
}

/// Returns true if `candidate` is strictly newer than `installed`.
pub fn is_newer(candidate: &str, installed: &str) -> bool {
    compare_version(candidate, installed) == Ordering::Greater
}

/// Returns the newest version of a non-empty sequence.
///
/// When several entries compare equal the first one wins.
pub fn latest_version<I, S>(versions: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = versions.into_iter();
    let first = iter.next().ok_or(PlugbayError::EmptyInput)?;
    let mut latest = first.as_ref().to_string();

    for version in iter {
        if is_newer(version.as_ref(), &latest) {
            latest = version.as_ref().to_string();
        }
    }

    Ok(latest)
}

fn segments(version: &str) -> Vec<u64> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    trimmed
        .split('.')
        .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
        .collect()
}
