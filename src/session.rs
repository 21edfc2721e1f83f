//! Data model for snapshot sessions and classification output.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Full program text captured at one instant, as an ordered list of lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    lines: Vec<String>,
}

impl Snapshot {
    /// Build a snapshot from pre-split lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Snapshot {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a snapshot from the full source text, splitting on newlines.
    pub fn from_text(text: &str) -> Self {
        Snapshot {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Chronologically ordered snapshots of one coding session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    snapshots: Vec<Snapshot>,
}

impl Session {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Session { snapshots }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of adjacent snapshot pairs the classifier will analyze.
    pub fn transition_count(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }
}

/// Substantive lines added by one forward-progress transition, in order.
pub type ForwardProgressStep = Vec<String>;

/// Indices of the forward-progress steps an adjustment refers back to.
pub type AdjustmentLocationSet = BTreeSet<usize>;

/// Edit intent assigned to one snapshot transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Label {
    /// No effective change after comment stripping.
    None,
    /// Test or debug churn outside substantive code.
    Test,
    /// Removal or restructuring of previously recorded work.
    Adjustment,
    /// New substantive work; the payload is the number of lines added.
    ForwardProg(usize),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::None => write!(f, "NONE"),
            Label::Test => write!(f, "TEST"),
            Label::Adjustment => write!(f, "ADJUSTMENT"),
            Label::ForwardProg(n) => write!(f, "FORWARD_PROG:{n}"),
        }
    }
}

/// Output of classifying one session.
///
/// `labels` is not index-aligned with transitions: a transition may emit
/// zero labels (no signal at all), one, or two (ADJUSTMENT followed by
/// FORWARD_PROG). `adjustment_locations` has exactly one entry per emitted
/// `Adjustment`, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub labels: Vec<Label>,
    pub forward_progress: Vec<ForwardProgressStep>,
    pub adjustment_locations: Vec<AdjustmentLocationSet>,
}
