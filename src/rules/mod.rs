//! Rule documents and single-row evaluation
//!
//! A rule document holds:
//! - An initial tape of symbols
//! - Named pattern tables, each evaluated first-match-wins
//! - Column ranges binding tables to columns
//!
//! Each new row keeps columns 0 and 1 at the boundary symbol and computes
//! every later column from the 3-cell window of the previous row ending there.

mod pattern;
mod range;

pub use pattern::{NoMatch, Pattern, PatternCell, PatternError, PatternTable, WILDCARD, WINDOW};
pub use range::{header, resolve_table, ColumnRange, DispatchError, HeaderCell};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::trace;

/// Number of leading columns pinned to the boundary symbol
pub const BOUNDARY_COLUMNS: usize = WINDOW - 1;

/// Tape symbol
///
/// Symbols are opaque tokens; they are only compared, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Symbol written into the boundary columns
    pub fn boundary() -> Self {
        Symbol("0".to_string())
    }

    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character, the only part patterns look at
    pub fn lead(&self) -> Option<char> {
        self.0.chars().next()
    }
}

impl From<&str> for Symbol {
    fn from(token: &str) -> Self {
        Symbol(token.to_string())
    }
}

impl From<String> for Symbol {
    fn from(token: String) -> Self {
        Symbol(token)
    }
}

impl From<char> for Symbol {
    fn from(ch: char) -> Self {
        Symbol(ch.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Tape {
    cells: Vec<Symbol>,
}

impl Tape {
    /// Build a tape from symbols
    pub fn new(cells: Vec<Symbol>) -> Self {
        Self { cells }
    }

    /// Cells, left to right
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Symbol at `column`
    pub fn get(&self, column: usize) -> Option<&Symbol> {
        self.cells.get(column)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the tape has no columns
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One symbol per character
impl From<&str> for Tape {
    fn from(s: &str) -> Self {
        Tape::new(s.chars().map(Symbol::from).collect())
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

/// Failure while computing one row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// Zero or several ranges cover a column
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A range names a table the document does not define
    #[error("No rule {0}")]
    UnknownTable(String),

    /// The governing table has no pattern for the window
    #[error(transparent)]
    NoMatch(#[from] NoMatch),
}

/// Parsed rule document, read-only during execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleDocument {
    /// Starting row
    initial: Tape,

    /// Tables by name
    tables: BTreeMap<String, PatternTable>,

    /// Column ranges in document order
    ranges: Vec<ColumnRange>,

    /// Symbol → color, for renderers only
    palette: BTreeMap<Symbol, String>,
}

impl RuleDocument {
    /// Create fluent builder
    pub fn builder() -> RuleDocumentBuilder {
        RuleDocumentBuilder::new()
    }

    /// Assemble a document from already-validated parts.
    ///
    /// Table names are expected to be unique; a later table replaces an
    /// earlier one of the same name.
    pub fn from_parts(
        initial: Tape,
        tables: impl IntoIterator<Item = PatternTable>,
        ranges: Vec<ColumnRange>,
        palette: BTreeMap<Symbol, String>,
    ) -> Self {
        Self {
            initial,
            tables: tables
                .into_iter()
                .map(|table| (table.name().to_string(), table))
                .collect(),
            ranges,
            palette,
        }
    }

    /// Starting row (may be empty)
    pub fn initial(&self) -> &Tape {
        &self.initial
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&PatternTable> {
        self.tables.get(name)
    }

    /// All tables, ordered by name
    pub fn tables(&self) -> impl Iterator<Item = &PatternTable> {
        self.tables.values()
    }

    /// Ranges in document order
    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    /// Display palette
    pub fn palette(&self) -> &BTreeMap<Symbol, String> {
        &self.palette
    }

    /// Color for a symbol, if the palette names one
    pub fn color(&self, symbol: &Symbol) -> Option<&str> {
        self.palette.get(symbol).map(String::as_str)
    }

    /// Header cells ordered by range start; does not reorder the document
    pub fn header(&self) -> Vec<HeaderCell> {
        header(&self.ranges)
    }

    /// Compute the row following `previous`.
    ///
    /// Columns are evaluated left to right against `previous` only; the first
    /// failing column aborts the whole row.
    pub fn step(&self, previous: &Tape) -> Result<Tape, StepError> {
        let mut cells = previous.cells().to_vec();
        for cell in cells.iter_mut().take(BOUNDARY_COLUMNS) {
            *cell = Symbol::boundary();
        }

        for (offset, window) in previous.cells().windows(WINDOW).enumerate() {
            let column = offset + BOUNDARY_COLUMNS;
            let name = resolve_table(column, &self.ranges)?;
            let table = self
                .tables
                .get(name)
                .ok_or_else(|| StepError::UnknownTable(name.to_string()))?;

            let output = table.apply(window)?;
            trace!(column, table = name, output = %output, "column evaluated");
            cells[column] = output;
        }

        Ok(Tape::new(cells))
    }
}

/// Errors raised by [`RuleDocumentBuilder::build`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A pattern key is not [`WINDOW`] characters long
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Two tables were added under one name
    #[error("table {0} is defined more than once")]
    DuplicateTable(String),
}

/// Builder for rule documents (fluent API)
#[derive(Debug, Default)]
pub struct RuleDocumentBuilder {
    initial: Tape,
    tables: Vec<(String, Vec<(String, Symbol)>)>,
    ranges: Vec<ColumnRange>,
    palette: BTreeMap<Symbol, String>,
}

impl RuleDocumentBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial tape, one symbol per character
    pub fn initial(mut self, initial: &str) -> Self {
        self.initial = Tape::from(initial);
        self
    }

    /// Set the initial tape from explicit symbols
    pub fn initial_tape(mut self, initial: Tape) -> Self {
        self.initial = initial;
        self
    }

    /// Add a table from `(key, output)` pairs in evaluation order
    pub fn table<K, O>(mut self, name: &str, patterns: impl IntoIterator<Item = (K, O)>) -> Self
    where
        K: Into<String>,
        O: Into<Symbol>,
    {
        let patterns = patterns
            .into_iter()
            .map(|(key, output)| (key.into(), output.into()))
            .collect();
        self.tables.push((name.to_string(), patterns));
        self
    }

    /// Bind `start..=end` to a table
    pub fn range(mut self, start: usize, end: usize, table: &str) -> Self {
        self.ranges.push(ColumnRange::new(start, end, table));
        self
    }

    /// Assign a display color to a symbol
    pub fn color(mut self, symbol: &str, color: &str) -> Self {
        self.palette.insert(Symbol::from(symbol), color.to_string());
        self
    }

    /// Build the document, validating every pattern key and table name
    pub fn build(self) -> Result<RuleDocument, BuildError> {
        let mut names = BTreeSet::new();
        if let Some((name, _)) = self.tables.iter().find(|(name, _)| !names.insert(name)) {
            return Err(BuildError::DuplicateTable(name.clone()));
        }

        let tables = self
            .tables
            .into_iter()
            .map(|(name, patterns)| -> Result<PatternTable, PatternError> {
                let patterns = patterns
                    .into_iter()
                    .map(|(key, output)| Pattern::new(&key, output))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PatternTable::new(name, patterns))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleDocument::from_parts(
            self.initial,
            tables,
            self.ranges,
            self.palette,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_document() -> RuleDocument {
        RuleDocument::builder()
            .initial("000")
            .table("T", [("...", "1")])
            .range(2, 2, "T")
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_step() {
        let doc = constant_document();
        let next = doc.step(doc.initial()).unwrap();
        assert_eq!(next.to_string(), "001");
    }

    #[test]
    fn test_boundary_columns_overwritten() {
        let doc = RuleDocument::builder()
            .initial("XX1")
            .table("Copy", [(".1.", "1"), ("...", "Y")])
            .range(2, 2, "Copy")
            .build()
            .unwrap();

        let next = doc.step(doc.initial()).unwrap();
        assert_eq!(next.to_string(), "00Y");
    }

    #[test]
    fn test_window_reads_previous_row() {
        // Shift right: column i copies column i-1 of the previous row
        let doc = RuleDocument::builder()
            .initial("00100")
            .table("Shift", [(".1.", "1"), (".0.", "0")])
            .range(2, 4, "Shift")
            .build()
            .unwrap();

        let next = doc.step(doc.initial()).unwrap();
        assert_eq!(next.to_string(), "00010");
    }

    #[test]
    fn test_short_tape_only_boundary() {
        let doc = RuleDocument::builder().initial("1").build().unwrap();
        assert_eq!(doc.step(doc.initial()).unwrap().to_string(), "0");
    }

    #[test]
    fn test_unknown_table() {
        let doc = RuleDocument::builder()
            .initial("000")
            .range(2, 2, "Missing")
            .build()
            .unwrap();

        let err = doc.step(doc.initial()).unwrap_err();
        assert_eq!(err, StepError::UnknownTable("Missing".to_string()));
        assert_eq!(err.to_string(), "No rule Missing");
    }

    #[test]
    fn test_dispatch_errors_propagate() {
        let doc = RuleDocument::builder()
            .initial("0000")
            .table("T", [("...", "1")])
            .range(2, 2, "T")
            .build()
            .unwrap();

        let err = doc.step(doc.initial()).unwrap_err();
        assert_eq!(err, StepError::Dispatch(DispatchError::NoRuleForColumn(3)));
    }

    #[test]
    fn test_builder_rejects_bad_key() {
        let err = RuleDocument::builder()
            .table("T", [("..", "1")])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Pattern(PatternError { length: 2, .. })));
    }

    #[test]
    fn test_builder_rejects_duplicate_table() {
        let err = RuleDocument::builder()
            .initial("000")
            .table("T", [("...", "1")])
            .table("U", [("...", "2")])
            .table("T", [("...", "3")])
            .range(2, 2, "T")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateTable("T".to_string()));
        assert_eq!(err.to_string(), "table T is defined more than once");
    }
}
