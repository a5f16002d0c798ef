//! Token and symbol types.
//!
//! [`Token`] is the public, owned form of one position in a linearized tree.
//! Markers and nonterminals are their own variants, so a terminal can never be
//! mistaken for either no matter what text it carries.
//!
//! [`Symbol`] is the compact `Copy` form the grammar builder works on: terminal
//! values are interned in a [`TerminalTable`] and referenced by index.

use crate::error::{CompressionError, Result};
use ahash::AHashMap as HashMap;
use std::borrow::Cow;
use std::fmt;

/// Wire text of [`Token::Separator`].
pub const SEPARATOR: &str = "|";
/// Wire text of [`Token::End`].
pub const END: &str = "]";

/// One element of a linearized tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// An original node value.
    Terminal(String),
    /// A reference to grammar rule `R<id>`.
    Nonterminal(u32),
    /// Boundary between a node's left and right children.
    Separator,
    /// End of a node.
    End,
}

impl Token {
    pub fn terminal(value: impl Into<String>) -> Self {
        Token::Terminal(value.into())
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Token::Separator | Token::End)
    }

    /// Returns the wire text of this token.
    ///
    /// Terminals are escaped so the result contains no spaces and never reads
    /// as a marker or a nonterminal name.
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            Token::Terminal(value) => escape_terminal(value),
            Token::Nonterminal(id) => Cow::Owned(format!("R{}", id)),
            Token::Separator => Cow::Borrowed(SEPARATOR),
            Token::End => Cow::Borrowed(END),
        }
    }

    /// Parses one wire token; `position` is only used for error reporting.
    pub fn from_wire(text: &str, position: usize) -> Result<Self> {
        match text {
            SEPARATOR => return Ok(Token::Separator),
            END => return Ok(Token::End),
            _ => {}
        }
        if is_nonterminal_form(text) {
            let id = parse_rule_name(text).ok_or_else(|| {
                CompressionError::malformed(position, format!("invalid rule name {}", text))
            })?;
            return Ok(Token::Nonterminal(id));
        }
        // Unescaped terminals never contain a backslash
        if text.contains('\\') {
            return unescape_terminal(text, position).map(Token::Terminal);
        }
        Ok(Token::Terminal(text.to_owned()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// True for `R` followed by one or more ASCII digits.
pub(crate) fn is_nonterminal_form(text: &str) -> bool {
    match text.strip_prefix('R') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Parses a rule name such as `R12` into its id.
///
/// Only the canonical spelling is accepted: `R007` is not rule 7.
pub(crate) fn parse_rule_name(text: &str) -> Option<u32> {
    if !is_nonterminal_form(text) {
        return None;
    }
    let digits = &text[1..];
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

fn escape_terminal(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        return Cow::Borrowed("\\e");
    }
    let needs_prefix = value == SEPARATOR || value == END || is_nonterminal_form(value);
    if !needs_prefix && !value.contains([' ', '\\']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 2);
    if needs_prefix {
        out.push('\\');
    }
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ' ' => out.push_str("\\s"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn unescape_terminal(text: &str, position: usize) -> Result<String> {
    if text == "\\e" {
        return Ok(String::new());
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some(other) => out.push(other),
            None => {
                return Err(CompressionError::malformed(
                    position,
                    "dangling escape at end of token",
                ))
            }
        }
    }
    Ok(out)
}

/// Compact symbol used while building a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Symbol {
    /// Terminal with index into the [`TerminalTable`]
    Terminal(u32),
    /// Rule reference
    Rule(u32),
    Separator,
    End,
}

impl Symbol {
    /// Integer code used by the rolling hash. Distinct symbols get distinct codes.
    pub(crate) fn code(self) -> u64 {
        match self {
            Symbol::Separator => 1,
            Symbol::End => 2,
            Symbol::Terminal(index) => 3 + 2 * index as u64,
            Symbol::Rule(id) => 4 + 2 * id as u64,
        }
    }
}

/// Deduplicated terminal values.
#[derive(Debug, Default, Clone)]
pub(crate) struct TerminalTable {
    values: Vec<String>,
    index: HashMap<String, u32>,
}

impl TerminalTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the index of a terminal value.
    pub(crate) fn intern(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.index.get(value) {
            return index;
        }
        let index = self.values.len() as u32;
        self.values.push(value.to_owned());
        self.index.insert(value.to_owned(), index);
        index
    }

    pub(crate) fn get(&self, index: u32) -> Option<&str> {
        self.values.get(index as usize).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Converts a token into a symbol, interning terminals.
    pub(crate) fn symbol_for(&mut self, token: &Token) -> Symbol {
        match token {
            Token::Terminal(value) => Symbol::Terminal(self.intern(value)),
            Token::Nonterminal(id) => Symbol::Rule(*id),
            Token::Separator => Symbol::Separator,
            Token::End => Symbol::End,
        }
    }

    /// Converts a symbol back to its token.
    pub(crate) fn token_for(&self, symbol: Symbol) -> Token {
        match symbol {
            Symbol::Terminal(index) => {
                Token::Terminal(self.get(index).unwrap_or_default().to_owned())
            }
            Symbol::Rule(id) => Token::Nonterminal(id),
            Symbol::Separator => Token::Separator,
            Symbol::End => Token::End,
        }
    }
}
