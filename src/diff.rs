//! Human-readable line diff with intraline change markers.
//!
//! The output follows the classic ndiff convention: a deleted and an added
//! line that are close at the character level come out as a synchronized
//! pair with a `?`-style marker entry carrying a column guide (`-` under
//! removed columns, `+` under inserted ones, `^` under replaced ones). The
//! marker can land either between the pair (old-side guide) or after it
//! (new-side guide); consumers must accept both placements.

use similar::{Algorithm, DiffOp, TextDiff, capture_diff_slices};

/// Two lines are treated as an intraline change when their character-level
/// similarity ratio reaches this cutoff.
const SYNCH_RATIO: f32 = 0.75;

/// One element of the line diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffEntry {
    /// Line present in both snapshots.
    Equal(String),
    /// Line only in the newer snapshot.
    Added(String),
    /// Line only in the older snapshot.
    Deleted(String),
    /// Column guide for an adjacent Deleted/Added near-match pair. The
    /// payload is informational; classification never reads it.
    Marker(String),
}

/// Diff two comment-stripped line sequences.
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                for line in &old[old_index..old_index + len] {
                    out.push(DiffEntry::Equal(line.clone()));
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => push_deleted(&old[old_index..old_index + old_len], &mut out),
            DiffOp::Insert {
                new_index, new_len, ..
            } => push_added(&new[new_index..new_index + new_len], &mut out),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => fancy_replace(
                &old[old_index..old_index + old_len],
                &new[new_index..new_index + new_len],
                &mut out,
            ),
        }
    }
    out
}

fn push_deleted(lines: &[String], out: &mut Vec<DiffEntry>) {
    for line in lines {
        out.push(DiffEntry::Deleted(line.clone()));
    }
}

fn push_added(lines: &[String], out: &mut Vec<DiffEntry>) {
    for line in lines {
        out.push(DiffEntry::Added(line.clone()));
    }
}

/// Resolve a replaced block by synchronizing on the most similar line pair.
///
/// Finds the (old, new) pair with the best character ratio; below the
/// cutoff the block degrades to plain deletions followed by additions.
/// Otherwise the regions before the pair are resolved recursively, the
/// pair is emitted with its markers, and the regions after follow.
fn fancy_replace(old: &[String], new: &[String], out: &mut Vec<DiffEntry>) {
    if old.is_empty() {
        push_added(new, out);
        return;
    }
    if new.is_empty() {
        push_deleted(old, out);
        return;
    }

    let mut best = (0usize, 0usize, -1.0f32);
    for (j, new_line) in new.iter().enumerate() {
        for (i, old_line) in old.iter().enumerate() {
            let ratio = TextDiff::from_chars(old_line.as_str(), new_line.as_str()).ratio();
            if ratio > best.2 {
                best = (i, j, ratio);
            }
        }
    }
    let (bi, bj, ratio) = best;
    if ratio < SYNCH_RATIO {
        push_deleted(old, out);
        push_added(new, out);
        return;
    }

    fancy_replace(&old[..bi], &new[..bj], out);
    emit_synch_pair(&old[bi], &new[bj], out);
    fancy_replace(&old[bi + 1..], &new[bj + 1..], out);
}

/// Emit a near-match pair: Deleted, old-side marker (if any differing
/// columns), Added, new-side marker (if any).
fn emit_synch_pair(old_line: &str, new_line: &str, out: &mut Vec<DiffEntry>) {
    let diff = TextDiff::from_chars(old_line, new_line);
    let mut old_guide = String::new();
    let mut new_guide = String::new();
    for op in diff.ops() {
        match *op {
            DiffOp::Equal { len, .. } => {
                extend_guide(&mut old_guide, ' ', len);
                extend_guide(&mut new_guide, ' ', len);
            }
            DiffOp::Delete { old_len, .. } => extend_guide(&mut old_guide, '-', old_len),
            DiffOp::Insert { new_len, .. } => extend_guide(&mut new_guide, '+', new_len),
            DiffOp::Replace {
                old_len, new_len, ..
            } => {
                extend_guide(&mut old_guide, '^', old_len);
                extend_guide(&mut new_guide, '^', new_len);
            }
        }
    }

    out.push(DiffEntry::Deleted(old_line.to_string()));
    if let Some(guide) = finish_guide(old_guide) {
        out.push(DiffEntry::Marker(guide));
    }
    out.push(DiffEntry::Added(new_line.to_string()));
    if let Some(guide) = finish_guide(new_guide) {
        out.push(DiffEntry::Marker(guide));
    }
}

fn extend_guide(guide: &mut String, c: char, len: usize) {
    guide.extend(std::iter::repeat_n(c, len));
}

fn finish_guide(guide: String) -> Option<String> {
    let trimmed = guide.trim_end();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
