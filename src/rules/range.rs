//! Column ranges: which table governs which columns

use thiserror::Error;

/// Failure to pick exactly one table for a column
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// No range covers the column
    #[error("No rules to apply for {0}")]
    NoRuleForColumn(usize),

    /// More than one range covers the column
    #[error("Multiple rules to apply for {0}")]
    AmbiguousRule(usize),
}

/// Inclusive column interval bound to a named table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRange {
    /// First covered column
    pub start: usize,

    /// Last covered column (inclusive)
    pub end: usize,

    /// Name of the governing table
    pub table: String,
}

impl ColumnRange {
    /// Create a range covering `start..=end`
    pub fn new(start: usize, end: usize, table: impl Into<String>) -> Self {
        Self {
            start,
            end,
            table: table.into(),
        }
    }

    /// Whether the column lies in `start..=end`. A reversed range covers nothing.
    pub fn contains(&self, column: usize) -> bool {
        self.start <= column && column <= self.end
    }

    /// Number of covered columns
    pub fn span(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }
}

/// Resolve the table governing `column`.
///
/// Ranges may overlap or arrive in any order; overlap is only an error for
/// the columns it actually touches.
pub fn resolve_table(column: usize, ranges: &[ColumnRange]) -> Result<&str, DispatchError> {
    let mut covering = ranges.iter().filter(|range| range.contains(column));

    let range = covering
        .next()
        .ok_or(DispatchError::NoRuleForColumn(column))?;
    if covering.next().is_some() {
        return Err(DispatchError::AmbiguousRule(column));
    }

    Ok(&range.table)
}

/// One header cell spanning the columns of a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Number of columns spanned
    pub span: usize,
    /// Table name shown above the span
    pub name: String,
}

/// Header cells ordered by range start.
///
/// Sorts a copy; the ranges used for execution are left untouched.
pub fn header(ranges: &[ColumnRange]) -> Vec<HeaderCell> {
    let mut ordered: Vec<&ColumnRange> = ranges.iter().collect();
    ordered.sort_by_key(|range| range.start);

    ordered
        .into_iter()
        .map(|range| HeaderCell {
            span: range.span(),
            name: range.table.clone(),
        })
        .collect()
}
