//! Structured, non-fatal problems collected while processing a batch

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// No extractable text layer (scanned, encrypted, corrupt)
    PdfUnreadable,
    /// A segmented block did not yield date + description + figures
    BlockParseFailure,
    /// A numeric cell could not be parsed and was left empty
    MalformedNumericField,
    /// Balance deltas were not computed for a statement
    ReconciliationSkipped,
    /// No bank was given and none could be detected
    UnknownBank,
    /// No description-like column to categorize on
    NoDescriptionColumn,
    /// Keyword table could not be loaded; categorization abandoned
    MasterTableUnavailable,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::PdfUnreadable => "pdf-unreadable",
            DiagnosticKind::BlockParseFailure => "block-parse-failure",
            DiagnosticKind::MalformedNumericField => "malformed-numeric-field",
            DiagnosticKind::ReconciliationSkipped => "reconciliation-skipped",
            DiagnosticKind::UnknownBank => "unknown-bank",
            DiagnosticKind::NoDescriptionColumn => "no-description-column",
            DiagnosticKind::MasterTableUnavailable => "master-table-unavailable",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// File the problem belongs to; `None` for batch-wide problems
    pub source_file: Option<String>,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            source_file: None,
            detail: detail.into(),
        }
    }

    pub fn for_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_file {
            Some(file) => write!(f, "[{}] {}: {}", self.kind, file, self.detail),
            None => write!(f, "[{}] {}", self.kind, self.detail),
        }
    }
}
