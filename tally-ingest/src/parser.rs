//! The per-bank parser seam.
//!
//! Each supported bank is one [`BankParser`]: a noise list for the line
//! normalizer, a segmenter, and a block extractor. The pipeline drives them
//! in that order and owns diagnostics and reconciliation.

use tally_core::Transaction;

use crate::extract::{BlockError, Extracted};
use crate::normalize::NoiseFilter;
use crate::registry::Bank;
use crate::types::{Line, TransactionBlock};

pub trait BankParser: Send + Sync {
    fn bank(&self) -> Bank;

    /// Boilerplate to drop before segmentation
    fn noise(&self) -> &NoiseFilter;

    /// Lowercase phrases that identify this bank's statements
    fn signature(&self) -> &[&'static str];

    /// Group normalized lines into one block per transaction
    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock>;

    /// Parse one block
    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError>;

    /// Whether amounts come from running-balance deltas
    fn needs_reconciliation(&self) -> bool {
        false
    }

    /// Statement-level cleanup over all extracted rows, in print order
    fn finish(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
    }

    /// True when a detection phrase appears in the line
    fn matches_signature(&self, line: &Line) -> bool {
        let lower = line.text.to_lowercase();
        self.signature().iter().any(|s| lower.contains(s))
    }
}
