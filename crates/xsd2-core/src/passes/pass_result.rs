//! Shared result type for transformation passes.
//!
//! Every pass mutates the IR in place and returns a `PassResult` with the
//! renames, exclusions and diagnostics it produced.

use crate::identity::XmlIdentity;
use crate::report::{Diagnostic, Rename, TransformReport};

/// Side records of a single pass.
#[derive(Debug, Default)]
pub struct PassResult {
    pub renames: Vec<Rename>,
    pub excluded: Vec<XmlIdentity>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassResult {
    /// A pass that changed nothing worth reporting.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_renames(renames: Vec<Rename>) -> Self {
        Self {
            renames,
            ..Self::default()
        }
    }

    pub fn with_excluded(excluded: Vec<XmlIdentity>) -> Self {
        Self {
            excluded,
            ..Self::default()
        }
    }

    pub fn with_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    /// Move this pass's records into the run report.
    pub fn merge_into_report(self, report: &mut TransformReport) {
        report.renames.extend(self.renames);
        report.excluded.extend(self.excluded);
        report.diagnostics.extend(self.diagnostics);
    }
}
