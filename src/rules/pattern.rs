//! Wildcard patterns over a 3-cell window
//!
//! A pattern key is three characters; `.` matches any symbol, anything else
//! must equal the leading character of the symbol at that position.

use std::fmt;

use thiserror::Error;

use super::Symbol;

/// Wildcard marker inside a pattern key
pub const WILDCARD: char = '.';

/// Number of cells a pattern inspects
pub const WINDOW: usize = 3;

/// Pattern key that is not exactly [`WINDOW`] characters long
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pattern \"{key}\" must have exactly 3 characters, found {length}")]
pub struct PatternError {
    /// Offending key text
    pub key: String,
    /// Number of characters found
    pub length: usize,
}

/// No pattern in a table accepted the window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No rule to apply for {} in {table} [{listing}]", join(.window))]
pub struct NoMatch {
    /// Window read from the previous row
    pub window: Vec<Symbol>,
    /// Name of the table that was searched
    pub table: String,
    /// Rendered table contents, in declared order
    pub listing: String,
}

fn join(window: &[Symbol]) -> String {
    window
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// One position of a pattern key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCell {
    /// Matches every symbol
    Any,

    /// Matches symbols whose first character is this one
    Literal(char),
}

impl PatternCell {
    /// Check a single symbol against this cell.
    ///
    /// Only the leading character of the symbol is compared, so a
    /// multi-character symbol `"10"` satisfies the literal `1`. Empty
    /// symbols only satisfy [`PatternCell::Any`].
    pub fn accepts(&self, symbol: &Symbol) -> bool {
        match self {
            PatternCell::Any => true,
            PatternCell::Literal(ch) => symbol.lead() == Some(*ch),
        }
    }

    fn as_char(&self) -> char {
        match self {
            PatternCell::Any => WILDCARD,
            PatternCell::Literal(ch) => *ch,
        }
    }
}

impl From<char> for PatternCell {
    fn from(ch: char) -> Self {
        if ch == WILDCARD {
            PatternCell::Any
        } else {
            PatternCell::Literal(ch)
        }
    }
}

/// Single wildcard rule: key → output symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    key: [PatternCell; WINDOW],
    output: Symbol,
}

impl Pattern {
    /// Parse a 3-character key such as `"1.X"`.
    pub fn new(key: &str, output: impl Into<Symbol>) -> Result<Self, PatternError> {
        let chars: Vec<char> = key.chars().collect();
        let cells: [char; WINDOW] = chars.as_slice().try_into().map_err(|_| PatternError {
            key: key.to_string(),
            length: chars.len(),
        })?;

        Ok(Self {
            key: cells.map(PatternCell::from),
            output: output.into(),
        })
    }

    /// Key cells, left to right
    pub fn key(&self) -> &[PatternCell; WINDOW] {
        &self.key
    }

    /// Symbol produced on a match
    pub fn output(&self) -> &Symbol {
        &self.output
    }

    /// True when every cell accepts the corresponding window symbol.
    pub fn matches(&self, window: &[Symbol]) -> bool {
        window.len() == WINDOW
            && self
                .key
                .iter()
                .zip(window)
                .all(|(cell, symbol)| cell.accepts(symbol))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.key {
            write!(f, "{}", cell.as_char())?;
        }
        write!(f, ": {}", self.output)
    }
}

/// Named, ordered list of patterns; the first match wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    name: String,
    patterns: Vec<Pattern>,
}

impl PatternTable {
    /// Create a table from patterns in evaluation order
    pub fn new(name: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Patterns in declared order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the table has no patterns (and therefore never matches)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First pattern accepting the window, if any
    pub fn lookup(&self, window: &[Symbol]) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.matches(window))
    }

    /// Evaluate the table against a window.
    ///
    /// There is no implicit fallback: a window no pattern accepts is an error.
    pub fn apply(&self, window: &[Symbol]) -> Result<Symbol, NoMatch> {
        self.lookup(window)
            .map(|pattern| pattern.output().clone())
            .ok_or_else(|| NoMatch {
                window: window.to_vec(),
                table: self.name.clone(),
                listing: self.listing(),
            })
    }

    fn listing(&self) -> String {
        self.patterns
            .iter()
            .map(Pattern::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
