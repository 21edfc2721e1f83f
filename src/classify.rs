//! The classification engine: one pass over adjacent snapshot pairs.
//!
//! Every transition is reduced to a handful of signals (token churn outside
//! substantive code, print churn, substantive lines added/deleted, intraline
//! edit magnitude, rearrangement) and the rule cascade in
//! [`label_transition`] turns those into zero, one, or two emitted labels.
//! The forward-progress history threads through the whole session by
//! exclusive ownership; a later transition sees exactly the steps appended
//! by the earlier ones.

use std::collections::HashMap;

use log::{debug, trace};

use crate::delta::bag_difference;
use crate::diff::{DiffEntry, diff_lines};
use crate::error::{ClassifyError, ClassifyResult};
use crate::lexer::{LineTokens, tokenize_line};
use crate::session::{
    AdjustmentLocationSet, Classification, ForwardProgressStep, Label, Session,
};
use crate::strip::strip_comments;

/// Lexeme marking output/debug statements.
const PRINT_LEXEME: &str = "print";

/// Heuristic for function-definition lines, e.g. `def rainfall(rain_list):`.
fn is_definition(line: &str) -> bool {
    line.contains("def") && line.contains('(') && line.contains(')')
}

/// Signals accumulated while walking one transition's diff.
#[derive(Debug, Default)]
struct Signals {
    /// Token churn on non-substantive (harness) lines.
    changed_out_funcs: usize,
    /// Intraline edits touching a print statement.
    print_edits: usize,
    /// Token-level magnitude of intraline edits to substantive lines.
    edited_tokens: usize,
    /// Substantive lines added, in diff order.
    added_lines: Vec<String>,
    /// Substantive lines deleted, in diff order.
    deleted_lines: Vec<String>,
    /// Steps the current deletions refer back to.
    locations: AdjustmentLocationSet,
}

/// Classify a whole session.
///
/// Pure function of the input: one label sequence, the accumulated
/// forward-progress steps, and one location set per emitted
/// [`Label::Adjustment`], in emission order.
///
/// # Errors
///
/// [`ClassifyError::EmptyHistory`] when a deletion is classified as an
/// adjustment before any forward progress exists (see
/// `resolve_adjustment_location`).
pub fn classify(session: &Session) -> ClassifyResult<Classification> {
    let mut out = Classification::default();
    let snapshots = session.snapshots();

    for transition in 1..snapshots.len() {
        let before = strip_comments(&snapshots[transition - 1]);
        let after = strip_comments(&snapshots[transition]);
        let entries = diff_lines(&before, &after);

        let mut signals = Signals::default();
        let mut handled = vec![false; entries.len()];
        classify_marker_pairs(
            &entries,
            &mut out.forward_progress,
            &mut signals,
            &mut handled,
            transition - 1,
        )?;
        classify_line_events(
            &entries,
            &handled,
            &mut out.forward_progress,
            &mut signals,
            transition - 1,
        )?;
        trace!("transition {}: {:?}", transition - 1, signals);
        label_transition(signals, &mut out);
    }
    Ok(out)
}

/// Token-delta pass: resolve each change marker to its Deleted/Added
/// neighbors and classify the intraline edit.
fn classify_marker_pairs(
    entries: &[DiffEntry],
    history: &mut Vec<ForwardProgressStep>,
    signals: &mut Signals,
    handled: &mut [bool],
    transition: usize,
) -> ClassifyResult<()> {
    for j in 0..entries.len() {
        if !matches!(entries[j], DiffEntry::Marker(_)) {
            continue;
        }
        let Some((add_idx, del_idx)) = marker_neighbors(entries, j) else {
            debug!("transition {transition}: skipping unpaired change marker at {j}");
            continue;
        };
        let (DiffEntry::Added(added_line), DiffEntry::Deleted(deleted_line)) =
            (&entries[add_idx], &entries[del_idx])
        else {
            unreachable!("marker_neighbors only returns Added/Deleted indices");
        };
        handled[add_idx] = true;
        handled[del_idx] = true;

        let added = tokenize_line(added_line);
        let deleted = tokenize_line(deleted_line);
        let (tokens_added, tokens_deleted) = bag_difference(&added.tokens, &deleted.tokens);

        if added_line.contains(PRINT_LEXEME) || deleted_line.contains(PRINT_LEXEME) {
            signals.print_edits += 1;
        } else if !added.is_block_opener && !is_definition(added_line) {
            signals.changed_out_funcs += tokens_added.len();
        } else {
            resolve_adjustment_location(history, deleted_line, &mut signals.locations, transition)?;
            signals.edited_tokens += tokens_added.len() + tokens_deleted.len();
        }
    }
    Ok(())
}

/// Locate the Added/Deleted pair a marker belongs to.
///
/// Accepted shapes: marker between the pair (Deleted at j-1, Added at j+1)
/// or after it (Deleted at j-2, Added at j-1). Anything else is too
/// ambiguous to resolve and the marker is skipped.
fn marker_neighbors(entries: &[DiffEntry], j: usize) -> Option<(usize, usize)> {
    let added_at = |i: Option<usize>| {
        i.filter(|&i| matches!(entries.get(i), Some(DiffEntry::Added(_))))
    };
    let deleted_at = |i: Option<usize>| {
        i.filter(|&i| matches!(entries.get(i), Some(DiffEntry::Deleted(_))))
    };

    if let (Some(add), Some(del)) = (added_at(Some(j + 1)), deleted_at(j.checked_sub(1))) {
        return Some((add, del));
    }
    if let (Some(add), Some(del)) = (added_at(j.checked_sub(1)), deleted_at(j.checked_sub(2))) {
        return Some((add, del));
    }
    None
}

/// Line-event pass: classify additions and deletions that were not part of
/// an intraline pair.
fn classify_line_events(
    entries: &[DiffEntry],
    handled: &[bool],
    history: &mut Vec<ForwardProgressStep>,
    signals: &mut Signals,
    transition: usize,
) -> ClassifyResult<()> {
    for (j, entry) in entries.iter().enumerate() {
        if handled[j] {
            continue;
        }
        match entry {
            DiffEntry::Deleted(text) if !text.trim().is_empty() => {
                let line = tokenize_line(text);
                if is_substantive(&line, text) {
                    resolve_adjustment_location(history, text, &mut signals.locations, transition)?;
                    signals.deleted_lines.push(text.clone());
                } else {
                    signals.changed_out_funcs += line.tokens.len();
                }
            }
            DiffEntry::Added(text) if !text.trim().is_empty() => {
                let line = tokenize_line(text);
                if is_substantive(&line, text) {
                    signals.added_lines.push(text.clone());
                } else {
                    signals.changed_out_funcs += line.tokens.len();
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Substantive = block-opening or definition line that is not print churn.
fn is_substantive(line: &LineTokens, text: &str) -> bool {
    (line.is_block_opener || is_definition(text)) && !text.contains(PRINT_LEXEME)
}

/// Map a deleted substantive line back to the forward-progress step(s) it
/// modifies.
///
/// Scans every step oldest-first; each stored line whose trimmed text
/// equals the trimmed deletion records that step's index and is rewritten
/// to the trimmed form, so future matches are exact-string matches. With
/// no match anywhere the deletion is attributed to the most recent step.
/// With no history at all the inconsistency is surfaced as
/// [`ClassifyError::EmptyHistory`] rather than indexed past the end.
fn resolve_adjustment_location(
    history: &mut [ForwardProgressStep],
    deleted_line: &str,
    locations: &mut AdjustmentLocationSet,
    transition: usize,
) -> ClassifyResult<()> {
    if history.is_empty() {
        return Err(ClassifyError::empty_history(transition, deleted_line));
    }
    let needle = deleted_line.trim();
    let mut found = false;
    for (k, step) in history.iter_mut().enumerate() {
        for stored in step.iter_mut() {
            if needle == stored.trim() {
                locations.insert(k);
                found = true;
                *stored = needle.to_string();
            }
        }
    }
    if !found {
        locations.insert(history.len() - 1);
    }
    Ok(())
}

/// Added and deleted substantive lines are a pure permutation of each
/// other (bag containment on trimmed texts, multiplicity respected).
fn is_rearrangement(added: &[String], deleted: &[String]) -> bool {
    if added.is_empty() || added.len() != deleted.len() {
        return false;
    }
    let mut bag: HashMap<&str, usize> = HashMap::new();
    for line in deleted {
        *bag.entry(line.trim()).or_default() += 1;
    }
    added.iter().all(|line| match bag.get_mut(line.trim()) {
        Some(n) if *n > 0 => {
            *n -= 1;
            true
        }
        _ => false,
    })
}

/// The rule cascade. Later rules overwrite the label chosen by earlier
/// ones; forward progress additionally pre-emits an ADJUSTMENT when the
/// transition also carried substantive deletions or intraline edits, so a
/// single transition can yield both labels.
fn label_transition(signals: Signals, out: &mut Classification) {
    let added = signals.added_lines.len();
    let deleted = signals.deleted_lines.len();
    let rearranged = is_rearrangement(&signals.added_lines, &signals.deleted_lines);

    let mut label = if signals.changed_out_funcs > 0 || signals.print_edits > 0 {
        Some(Label::Test)
    } else {
        None
    };
    if added == 0
        && deleted == 0
        && signals.print_edits == 0
        && signals.changed_out_funcs == 0
        && signals.edited_tokens == 0
        && !rearranged
    {
        label = Some(Label::None);
    }
    if rearranged
        || (signals.edited_tokens > 0 && added == 0)
        || (deleted > 0 && added == 0)
    {
        label = Some(Label::Adjustment);
    }
    if added > 0 && signals.print_edits < added && !rearranged {
        if deleted > 0 || signals.edited_tokens > 0 {
            out.labels.push(Label::Adjustment);
            out.adjustment_locations.push(signals.locations);
        }
        out.labels.push(Label::ForwardProg(added));
        out.forward_progress.push(signals.added_lines);
        return;
    }
    match label {
        Some(Label::Adjustment) => {
            out.labels.push(Label::Adjustment);
            out.adjustment_locations.push(signals.locations);
        }
        Some(label) => out.labels.push(label),
        // No signal fired at all: the transition emits nothing.
        None => {}
    }
}
