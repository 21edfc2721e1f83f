//! Error handling types for session classification.
//!
//! Most failure modes in the engine are recovered locally (a line that
//! fails to tokenize keeps its partial tokens, an ambiguous change marker
//! is skipped); the variants here are the ones that must reach the caller.

use thiserror::Error;

/// Errors surfaced by session classification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Adjustment resolution ran before any forward progress was recorded.
    ///
    /// A deletion was classified as an adjustment, but the session has no
    /// forward-progress step it could refer back to. The classification
    /// rules are inconsistent for this session, so the inconsistency is
    /// reported instead of defaulting to a bogus step index.
    #[error(
        "adjustment resolution with empty history at transition {transition}: deleted line {line:?}"
    )]
    EmptyHistory { transition: usize, line: String },
}

/// Result type for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

impl ClassifyError {
    /// Create an empty-history resolution error.
    pub fn empty_history(transition: usize, line: impl Into<String>) -> Self {
        ClassifyError::EmptyHistory {
            transition,
            line: line.into(),
        }
    }
}
