//! Trailing-comment removal applied to snapshots before diffing.

use crate::session::Snapshot;

/// Truncate every line at its first `#`.
///
/// The scan is a naive character search with no string-literal awareness:
/// a `#` inside a string literal truncates the line too. This matches the
/// established classifier behavior that downstream consumers rely on.
pub fn strip_comments(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .lines()
        .iter()
        .map(|line| match line.find('#') {
            Some(idx) => line[..idx].to_string(),
            None => line.clone(),
        })
        .collect()
}
