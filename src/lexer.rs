//! Tolerant single-line lexer for Python source fragments.
//!
//! Each diff line is tokenized as a standalone fragment, so the input is
//! frequently not a valid statement on its own (truncated strings, dangling
//! brackets, half an expression). The lexer therefore never fails: a
//! malformed fragment yields whatever tokens were produced before the bad
//! spot, with `is_block_opener` cleared.
//!
//! Only comparable token categories are emitted. The structural categories
//! of a full tokenizer (end-of-stream, logical newlines, dedents, encoding
//! declarations) would make two otherwise-identical lines compare unequal
//! for spurious reasons, so they are filtered out by construction. The
//! indentation token is kept: its lexeme is the leading whitespace, and
//! indentation changes are part of the comparable stream.

use log::debug;

/// Comparable token categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Leading whitespace on a non-blank line (indentation increase for a
    /// fragment lexed from column zero).
    Indent,
    /// Identifier or keyword.
    Name,
    /// Numeric literal.
    Number,
    /// String literal, including any prefix and quotes.
    Str,
    /// Operator or delimiter.
    Op,
    /// A character the lexer cannot place (ERRORTOKEN analogue).
    Error,
}

/// One lexical token. Only `(kind, lexeme)` matter for comparison;
/// positions are deliberately not tracked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

/// Tokenizer output for one line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineTokens {
    pub tokens: Vec<Token>,
    /// True iff an indentation-increase token appeared and the line lexed
    /// cleanly to its end.
    pub is_block_opener: bool,
}

/// Tokenize one line of Python source as a standalone fragment.
///
/// Never panics and never returns an error: a malformed fragment (e.g. an
/// unterminated string because the line was cut mid-statement) returns the
/// tokens produced so far with `is_block_opener = false`.
pub fn tokenize_line(line: &str) -> LineTokens {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() && is_line_space(chars[i]) {
        i += 1;
    }
    if i >= chars.len() {
        // Blank logical line: no tokens, no indent.
        return LineTokens::default();
    }

    let mut tokens = Vec::new();
    let mut indented = false;
    if i > 0 {
        tokens.push(Token::new(TokenKind::Indent, collect(&chars[..i])));
        indented = true;
    }

    while i < chars.len() {
        let c = chars[i];
        if is_line_space(c) {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }
        if c == '\\' && i + 1 >= chars.len() {
            // Line continuation; nothing more to lex on this line.
            break;
        }
        if is_name_start(c) {
            let start = i;
            while i < chars.len() && is_name_continue(chars[i]) {
                i += 1;
            }
            let name = collect(&chars[start..i]);
            // A short name made of string-prefix letters glued to a quote
            // is the prefix of a string literal, not an identifier.
            if i < chars.len() && is_quote(chars[i]) && is_string_prefix(&name) {
                match scan_string(&chars, i) {
                    Some(end) => {
                        tokens.push(Token::new(TokenKind::Str, collect(&chars[start..end])));
                        i = end;
                        continue;
                    }
                    None => return truncated(line, tokens),
                }
            }
            tokens.push(Token::new(TokenKind::Name, name));
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && peek_digit(&chars, i + 1)) {
            let start = i;
            i = scan_number(&chars, i);
            tokens.push(Token::new(TokenKind::Number, collect(&chars[start..i])));
            continue;
        }
        if is_quote(c) {
            match scan_string(&chars, i) {
                Some(end) => {
                    tokens.push(Token::new(TokenKind::Str, collect(&chars[i..end])));
                    i = end;
                    continue;
                }
                None => return truncated(line, tokens),
            }
        }
        if let Some(len) = match_operator(&chars, i) {
            tokens.push(Token::new(TokenKind::Op, collect(&chars[i..i + len])));
            i += len;
            continue;
        }
        // Unknown character: keep it comparable and move on.
        tokens.push(Token::new(TokenKind::Error, c.to_string()));
        i += 1;
    }

    LineTokens {
        tokens,
        is_block_opener: indented,
    }
}

/// Malformed-fragment exit: partial tokens, indent flag cleared.
fn truncated(line: &str, tokens: Vec<Token>) -> LineTokens {
    debug!(
        "truncated lex of fragment {:?} after {} token(s)",
        line,
        tokens.len()
    );
    LineTokens {
        tokens,
        is_block_opener: false,
    }
}

fn is_line_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\u{0c}'
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn peek_digit(chars: &[char], i: usize) -> bool {
    chars.get(i).is_some_and(|c| c.is_ascii_digit())
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Valid string literal prefixes: r, b, u, f and the two-letter raw-bytes
/// and raw-fstring combinations, any case.
fn is_string_prefix(name: &str) -> bool {
    if name.is_empty() || name.len() > 2 {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    matches!(
        lower.as_str(),
        "r" | "b" | "u" | "f" | "rb" | "br" | "rf" | "fr"
    )
}

/// Scan a string literal starting at the opening quote.
///
/// Returns the index one past the closing quote, or None when the literal
/// is unterminated on this line (the malformed-fragment case). Handles
/// single- and triple-quoted forms; backslash escapes the next character.
fn scan_string(chars: &[char], quote_pos: usize) -> Option<usize> {
    let quote = chars[quote_pos];
    let triple =
        chars.get(quote_pos + 1) == Some(&quote) && chars.get(quote_pos + 2) == Some(&quote);
    let mut i = quote_pos + if triple { 3 } else { 1 };

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == quote {
            if !triple {
                return Some(i + 1);
            }
            if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                return Some(i + 3);
            }
        }
        i += 1;
    }
    None
}

/// Scan a numeric literal. Consumes digits, letters (hex digits, exponent
/// markers, imaginary suffix), underscores and dots, plus a sign directly
/// after an exponent marker.
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    let mut prev = '\0';
    while i < chars.len() {
        let c = chars[i];
        let exponent_sign = (c == '+' || c == '-')
            && (prev == 'e' || prev == 'E')
            && peek_digit(chars, i + 1);
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
            prev = c;
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Operator and delimiter table, longest match first.
const OPS3: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const OPS2: [&str; 19] = [
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "->", ":=", "+=", "-=", "*=", "/=", "%=",
    "@=", "&=", "|=", "^=",
];
const OPS1: &str = "+-*/%@&|^~<>=()[]{},:.;";

fn match_operator(chars: &[char], i: usize) -> Option<usize> {
    let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
    if OPS3.iter().any(|op| rest.starts_with(op)) {
        return Some(3);
    }
    if OPS2.iter().any(|op| rest.starts_with(op)) {
        return Some(2);
    }
    if OPS1.contains(chars[i]) {
        return Some(1);
    }
    None
}
