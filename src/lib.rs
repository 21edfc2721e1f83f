//! snapmid classifies how a program's source text evolves across a
//! sequence of timestamped snapshots into a small taxonomy of edit
//! intents: no-op, test/debug churn, adjustment of prior work, or forward
//! progress.
//!
//! The entry point is [`classify`], which walks one [`Session`] pair by
//! pair: comments are stripped, the pair is line-diffed with intraline
//! change detection, each changed line is categorized at the token level,
//! and a rule cascade turns the signals into labels. Adjustments are
//! linked back to the earlier forward-progress step(s) they modify.

pub mod classify;
pub mod delta;
pub mod diff;
pub mod error;
pub mod lexer;
pub mod session;
pub mod strip;

pub use classify::classify;
pub use delta::bag_difference;
pub use diff::{DiffEntry, diff_lines};
pub use error::{ClassifyError, ClassifyResult};
pub use lexer::{LineTokens, Token, TokenKind, tokenize_line};
pub use session::{
    AdjustmentLocationSet, Classification, ForwardProgressStep, Label, Session, Snapshot,
};
pub use strip::strip_comments;
