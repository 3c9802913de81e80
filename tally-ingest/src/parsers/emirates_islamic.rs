//! Emirates Islamic statement parser (table)
//!
//! Six columns: transaction date, value date, narration, debit, credit,
//! running balance. A narration that wraps onto a new table row prints the
//! same running balance again; such rows are merged into the row above.

use tally_core::Transaction;

use crate::extract::{BlockError, Extracted};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::parsers::tabular::TableSpec;
use crate::registry::Bank;
use crate::table::Column;
use crate::types::{Line, TransactionBlock};

const TABLE: TableSpec = TableSpec {
    header: &[
        ("Transaction Date", Column::Date),
        ("Value Date", Column::ValueDate),
        ("Narration", Column::Description),
        ("Debit", Column::Debit),
        ("Credit", Column::Credit),
        ("Running Balance", Column::Balance),
    ],
    positional: &[
        Column::Date,
        Column::ValueDate,
        Column::Description,
        Column::Debit,
        Column::Credit,
        Column::Balance,
    ],
};

pub struct EmiratesIslamicParser {
    noise: NoiseFilter,
}

impl EmiratesIslamicParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new().pattern(r"(?i)^page\s*\d+(\s*of\s*\d+)?$"),
        }
    }
}

impl Default for EmiratesIslamicParser {
    fn default() -> Self {
        Self::new()
    }
}

fn same_balance(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() < 0.005,
        _ => false,
    }
}

fn max_side(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

impl BankParser for EmiratesIslamicParser {
    fn bank(&self) -> Bank {
        Bank::EmiratesIslamic
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["emirates islamic", "emiratesislamic.ae"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        TABLE.segment(lines)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        TABLE.extract(block, source_file)
    }

    fn finish(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let mut merged: Vec<Transaction> = Vec::with_capacity(transactions.len());
        for txn in transactions {
            match merged.last_mut() {
                Some(prev) if same_balance(prev.balance, txn.balance) => {
                    if !txn.description.is_empty() {
                        prev.description = format!("{} {}", prev.description, txn.description);
                    }
                    let debit = max_side(prev.debit, txn.debit);
                    let credit = max_side(prev.credit, txn.credit);
                    *prev = prev.clone().with_split(debit, credit);
                }
                _ => merged.push(txn),
            }
        }
        merged
    }
}
