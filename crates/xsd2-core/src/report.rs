//! Record of what a transformation run changed, plus non-fatal diagnostics.
//!
//! The report travels next to the transformed IR so an emitter (or a human)
//! can map generated names back to the schema and see what was dropped.

use serde::{Deserialize, Serialize};

use crate::identity::XmlIdentity;

/// Everything a run changed outside the IR itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    /// Renames, in the order they were applied.
    pub renames: Vec<Rename>,
    /// Types excluded from emission.
    pub excluded: Vec<XmlIdentity>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, other: TransformReport) {
        self.renames.extend(other.renames);
        self.excluded.extend(other.excluded);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// One identifier rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Rename {
    Type {
        from: String,
        to: String,
    },
    Member {
        type_name: String,
        from: String,
        to: String,
    },
    EnumValue {
        type_name: String,
        from: String,
        to: String,
    },
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Node the diagnostic is about (e.g. `{urn:x}Address`).
    pub subject: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Classification of diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Two inputs define the same XML type with different members; the
    /// first-seen definition was kept.
    MergeConflict {
        kept_source: String,
        dropped_source: String,
    },
    /// A synthesized name collided with an existing one and was suffixed.
    NameCollision { requested: String, assigned: String },
}
