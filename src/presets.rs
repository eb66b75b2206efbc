//! Built-in rule documents
//!
//! Each preset is YAML rule text compiled into the binary; stores fall back
//! to it when nothing has been saved under the preset's name.

use crate::document::{parse_document, DocumentError};
use crate::rules::RuleDocument;

/// Named rule text shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Unique name, also the store key
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// YAML rule text
    pub rules: &'static str,
}

impl Preset {
    /// Parse the rule text
    pub fn document(&self) -> Result<RuleDocument, DocumentError> {
        parse_document(self.rules)
    }
}

/// All presets, in display order
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Addition",
        description: "Bit-serial addition of two interleaved LSB-first numbers",
        rules: include_str!("../presets/addition.yaml"),
    },
    Preset {
        name: "Tournament_reduce",
        description: "Pairwise AND/OR/XOR reduction of a bit string",
        rules: include_str!("../presets/tournament_reduce.yaml"),
    },
    Preset {
        name: "01_Counter",
        description: "Binary counter with carry cells",
        rules: include_str!("../presets/counter.yaml"),
    },
];

/// Look up a preset by exact name
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

/// Preset names, in display order
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|preset| preset.name)
}
