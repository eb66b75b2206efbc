//! `serde_yaml::Value` → `RuleDocument` conversion

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Number, Value};
use tracing::debug;

use super::DocumentError;
use crate::rules::{ColumnRange, Pattern, PatternTable, RuleDocument, Symbol, Tape};

const INITIAL_KEY: &str = "initial";
const COLORS_KEY: &str = "colors";
const RULES_KEY: &str = "rules";

/// Range bound written as an integer, a float or text with a leading integer.
///
/// Floats and text are truncated to their integer part, so `2.0`, `2.7` and
/// `"2px"` all name column 2.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Bound {
    Number(i64),
    Float(f64),
    Text(String),
}

impl Bound {
    fn column(&self) -> Result<usize, String> {
        let value = match self {
            Bound::Number(n) => *n,
            Bound::Float(f) if f.is_finite() => f.trunc() as i64,
            Bound::Float(f) => return Err(format!("bound {} is not finite", f)),
            Bound::Text(text) => leading_integer(text)
                .ok_or_else(|| format!("bound \"{}\" is not an integer", text))?,
        };
        usize::try_from(value).map_err(|_| format!("bound {} is negative", value))
    }
}

/// Optional sign and digits at the start of `text`, after leading whitespace
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let unsigned = text.trim_start_matches(['+', '-']);
    let sign_len = text.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned.len() - unsigned.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

#[derive(Debug, Deserialize)]
struct RawRange {
    start: Bound,
    end: Bound,
    name: Value,
}

pub(super) fn document_from_value(root: Value) -> Result<RuleDocument, DocumentError> {
    let Value::Mapping(root) = root else {
        return Err(DocumentError::NotAMapping);
    };

    let mut initial = Tape::default();
    let mut palette = BTreeMap::new();
    let mut ranges = Vec::new();
    let mut candidates = Vec::new();

    for (key, value) in root {
        let key = scalar_text(&key, "top-level key")?;
        match key.as_str() {
            INITIAL_KEY => initial = Tape::from(scalar_text(&value, INITIAL_KEY)?.as_str()),
            COLORS_KEY => palette = colors(value)?,
            RULES_KEY => ranges = column_ranges(value)?,
            _ => match value {
                Value::Sequence(entries) => candidates.push((key, entries)),
                _ => debug!(key = %key, "ignoring non-table top-level key"),
            },
        }
    }

    // Only tables some range names must be well formed; the rest are kept
    // when they parse and dropped otherwise.
    let mut tables = Vec::with_capacity(candidates.len());
    for (name, entries) in candidates {
        let referenced = ranges.iter().any(|range: &ColumnRange| range.table == name);
        match pattern_table(name, &entries) {
            Ok(table) => tables.push(table),
            Err(err) if !referenced => debug!(error = %err, "skipping unused malformed table"),
            Err(err) => return Err(err),
        }
    }

    Ok(RuleDocument::from_parts(initial, tables, ranges, palette))
}

/// Textual form of a scalar, the way symbols are written in rule text
fn scalar_text(value: &Value, context: &str) -> Result<String, DocumentError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(number_text(n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value, context),
        _ => Err(DocumentError::NotAScalar {
            context: context.to_string(),
        }),
    }
}

/// Integral floats print without a fractional part: `1.0` is the symbol `1`.
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(f) if number.is_f64() => {
            if f.is_nan() {
                "NaN".to_string()
            } else if f.is_infinite() {
                let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
                text.to_string()
            } else if f == 0.0 {
                "0".to_string()
            } else {
                f.to_string()
            }
        }
        _ => number.to_string(),
    }
}

fn colors(value: Value) -> Result<BTreeMap<Symbol, String>, DocumentError> {
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(DocumentError::MalformedColors),
    };

    mapping
        .iter()
        .map(|(symbol, color)| -> Result<(Symbol, String), DocumentError> {
            Ok((
                Symbol::from(scalar_text(symbol, "color symbol")?),
                scalar_text(color, "color")?,
            ))
        })
        .collect()
}

fn column_ranges(value: Value) -> Result<Vec<ColumnRange>, DocumentError> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(DocumentError::MalformedRange {
                index: 0,
                reason: "rules must be a sequence".to_string(),
            })
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<ColumnRange, DocumentError> {
            let malformed = |reason: String| DocumentError::MalformedRange { index, reason };
            let raw: RawRange =
                serde_yaml::from_value(entry).map_err(|e| malformed(e.to_string()))?;

            Ok(ColumnRange::new(
                raw.start.column().map_err(malformed)?,
                raw.end.column().map_err(malformed)?,
                scalar_text(&raw.name, "rule name")?,
            ))
        })
        .collect()
}

fn pattern_table(name: String, entries: &[Value]) -> Result<PatternTable, DocumentError> {
    let patterns = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| pattern_entry(&name, index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PatternTable::new(name, patterns))
}

fn pattern_entry(table: &str, index: usize, entry: &Value) -> Result<Pattern, DocumentError> {
    let malformed = || DocumentError::MalformedEntry {
        table: table.to_string(),
        index,
    };

    let pair: &Mapping = entry.as_mapping().ok_or_else(malformed)?;
    if pair.len() != 1 {
        return Err(malformed());
    }
    let (key, output) = pair.iter().next().ok_or_else(malformed)?;

    let key = scalar_text(key, "pattern")?;
    let output = scalar_text(output, "pattern output")?;
    Pattern::new(&key, output).map_err(|source| DocumentError::Pattern {
        table: table.to_string(),
        source,
    })
}
