//! Rule documents from YAML text
//!
//! Recognized top-level keys:
//! - `initial`: string, one symbol per character
//! - `colors`: symbol → color mapping (display only)
//! - `rules`: sequence of `{ start, end, name }`
//!
//! Every other key holding a sequence is a table: single-entry mappings
//! `"<3-char pattern>": <symbol>`, evaluated in order. Other keys are
//! ignored, and only tables named by a range have to be well formed.

mod yaml;

use std::str::FromStr;

use thiserror::Error;

use crate::rules::{PatternError, RuleDocument};

/// Errors raised while turning rule text into a [`RuleDocument`]
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Text is not valid YAML
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// Root is empty or not a mapping
    #[error("rule document must be a mapping")]
    NotAMapping,

    /// A table entry is not a single `pattern: symbol` pair
    #[error("entry {index} of table {table} must be a single \"pattern: symbol\" pair")]
    MalformedEntry {
        /// Table name
        table: String,
        /// 0-based entry position
        index: usize,
    },

    /// Pattern key of the wrong length
    #[error("table {table}: {source}")]
    Pattern {
        /// Table name
        table: String,
        /// Length failure
        #[source]
        source: PatternError,
    },

    /// `colors` is not a mapping
    #[error("colors must be a mapping from symbol to color")]
    MalformedColors,

    /// Entry in `rules` is missing fields or has bad bounds
    #[error("rule range {index}: {reason}")]
    MalformedRange {
        /// 0-based position in `rules`
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// A value used as a symbol or name is not a scalar
    #[error("{context} must be a string, number or boolean")]
    NotAScalar {
        /// Where the value appeared
        context: String,
    },
}

/// Parse YAML rule text into a document
pub fn parse_document(text: &str) -> Result<RuleDocument, DocumentError> {
    let root: serde_yaml::Value = serde_yaml::from_str(text)?;
    yaml::document_from_value(root)
}

impl FromStr for RuleDocument {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_document(s)
    }
}
