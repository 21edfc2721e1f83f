//! Multiset (bag) difference over lexical tokens.

use std::collections::HashMap;

use crate::lexer::{Token, TokenKind};

/// Tokens of `kept` left over after cancelling against `removed`,
/// multiplicity-aware, keyed by `(kind, lexeme)` and ignoring position.
fn surplus(kept: &[Token], removed: &[Token]) -> Vec<Token> {
    let mut budget: HashMap<(TokenKind, &str), usize> = HashMap::new();
    for t in removed {
        *budget.entry((t.kind, t.lexeme.as_str())).or_default() += 1;
    }
    let mut out = Vec::new();
    for t in kept {
        match budget.get_mut(&(t.kind, t.lexeme.as_str())) {
            Some(n) if *n > 0 => *n -= 1,
            _ => out.push(t.clone()),
        }
    }
    out
}

/// Bag difference in both directions for a replaced line pair.
///
/// Returns `(tokens_added, tokens_deleted)`: what the added line carries
/// beyond the deleted one, and vice versa.
pub fn bag_difference(added: &[Token], deleted: &[Token]) -> (Vec<Token>, Vec<Token>) {
    (surplus(added, deleted), surplus(deleted, added))
}
