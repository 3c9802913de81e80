use tally_core::{Diagnostic, DiagnosticKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategorizeError {
    #[error("no description-like column among {columns:?}")]
    NoDescriptionColumn { columns: Vec<String> },
    #[error("keyword table unavailable: {0}")]
    MasterTableUnavailable(String),
    #[error("keyword table is missing the {0:?} column")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CategorizeError {
    /// Diagnostic for the batch report. Plain I/O and CSV errors have no
    /// diagnostic kind; callers report those as errors.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        let kind = match self {
            CategorizeError::NoDescriptionColumn { .. } => DiagnosticKind::NoDescriptionColumn,
            CategorizeError::MasterTableUnavailable(_) | CategorizeError::MissingColumn(_) => {
                DiagnosticKind::MasterTableUnavailable
            }
            CategorizeError::Csv(_) | CategorizeError::Io(_) => return None,
        };
        Some(Diagnostic::new(kind, self.to_string()))
    }
}
