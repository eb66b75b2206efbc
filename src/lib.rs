//! # Column-Rule Tape Automata
//!
//! This library evaluates one-dimensional, cellular-automaton-like
//! computations described by small rule documents.
//!
//! ## Core Algorithm
//!
//! 1. **Dispatch**: each column ≥ 2 is governed by exactly one named table,
//!    chosen by the column ranges of the document
//! 2. **Matching**: the table's wildcard patterns are tried in order against
//!    the 3-cell window of the previous row ending at that column
//! 3. **Boundary**: columns 0 and 1 of every computed row hold `"0"`
//! 4. **History**: the initial row plus [`GENERATIONS`] computed rows
//!
//! Any failure aborts the run; no partial history is ever returned.
//!
//! ## Usage Example
//!
//! ```
//! use cellrule::{run, RuleDocument};
//!
//! let doc = RuleDocument::builder()
//!     .initial("000")
//!     .table("T", [("...", "1")])
//!     .range(2, 2, "T")
//!     .build()?;
//!
//! let history = run(&doc)?;
//! assert_eq!(history.len(), 21);
//! assert_eq!(history.last().to_string(), "001");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod rules;      // Symbols, tapes, tables, ranges, single-row step
pub mod document;   // YAML rule text → RuleDocument
pub mod store;      // Rule text persistence keyed by document name
pub mod presets;    // Built-in rule documents

// Re-exports for convenience
pub use rules::{
    BuildError, ColumnRange, DispatchError, HeaderCell, NoMatch, Pattern, PatternTable,
    RuleDocument, StepError, Symbol, Tape,
};
pub use document::{parse_document, DocumentError};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Generations computed after the initial row
pub const GENERATIONS: usize = 20;

/// Configuration parameters for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of rows computed after the initial one
    pub generations: usize,

    /// Log every computed row at debug level
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generations: GENERATIONS,
            verbose: false,
        }
    }
}

impl EngineConfig {
    /// Override the generation count
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Enable verbose mode.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

/// Errors that abort a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The document has no initial tape
    #[error("Provide initial value")]
    MissingInitial,

    /// Computing a row failed
    #[error("generation {generation}: {source}")]
    Step {
        /// Index of the row being computed (1-based; row 0 is the initial tape)
        generation: usize,
        /// Underlying failure
        #[source]
        source: StepError,
    },
}

impl ExecutionError {
    /// Generation at which the run stopped, if a step failed
    pub fn generation(&self) -> Option<usize> {
        match self {
            ExecutionError::MissingInitial => None,
            ExecutionError::Step { generation, .. } => Some(*generation),
        }
    }

    /// Underlying step failure, if any
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            ExecutionError::MissingInitial => None,
            ExecutionError::Step { source, .. } => Some(source),
        }
    }
}

/// Every row of one run, initial tape first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    rows: Vec<Tape>,
}

impl History {
    /// All rows
    pub fn rows(&self) -> &[Tape] {
        &self.rows
    }

    /// Number of rows (generations + 1)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; a history holds at least the initial row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns per row
    pub fn width(&self) -> usize {
        self.initial().len()
    }

    /// Row 0
    pub fn initial(&self) -> &Tape {
        &self.rows[0]
    }

    /// Final row
    pub fn last(&self) -> &Tape {
        &self.rows[self.rows.len() - 1]
    }

    /// Iterate rows in order
    pub fn iter(&self) -> std::slice::Iter<'_, Tape> {
        self.rows.iter()
    }

    /// Take ownership of the rows
    pub fn into_rows(self) -> Vec<Tape> {
        self.rows
    }

    /// Digest of every symbol of every row
    ///
    /// Identical histories always produce identical fingerprints.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for row in &self.rows {
            for cell in row.cells() {
                hasher.update(&(cell.as_str().len() as u64).to_le_bytes());
                hasher.update(cell.as_str().as_bytes());
            }
            hasher.update(b"\n");
        }
        hasher.finalize()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Tape;
    type IntoIter = std::slice::Iter<'a, Tape>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Drives [`RuleDocument::step`] for a fixed number of generations
#[derive(Debug, Clone, Default)]
pub struct HistoryEngine {
    config: EngineConfig,
}

impl HistoryEngine {
    /// Create new engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the document from its initial tape.
    ///
    /// Row `g` is computed from the completed row `g - 1`; the first failing
    /// row aborts the run and nothing computed so far is returned.
    pub fn run(&self, doc: &RuleDocument) -> Result<History, ExecutionError> {
        if doc.initial().is_empty() {
            warn!("rule document has no initial tape");
            return Err(ExecutionError::MissingInitial);
        }

        let mut rows = Vec::with_capacity(self.config.generations + 1);
        rows.push(doc.initial().clone());

        for generation in 1..=self.config.generations {
            let next = doc.step(&rows[generation - 1]).map_err(|source| {
                warn!(generation, error = %source, "run aborted");
                ExecutionError::Step { generation, source }
            })?;

            if self.config.verbose {
                debug!(generation, row = %next, "generation computed");
            }
            rows.push(next);
        }

        info!(
            generations = self.config.generations,
            width = doc.initial().len(),
            "run complete"
        );
        Ok(History { rows })
    }
}

/// Run a document for [`GENERATIONS`] generations
pub fn run(doc: &RuleDocument) -> Result<History, ExecutionError> {
    HistoryEngine::default().run(doc)
}

/// Compute the row following `tape`
pub fn step(tape: &Tape, doc: &RuleDocument) -> Result<Tape, StepError> {
    doc.step(tape)
}
