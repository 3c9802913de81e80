//! Abu Dhabi Islamic Bank statement parser (text)
//!
//! The text layer prints every table cell on its own line. A row starts with
//! the transaction date and value date on two adjacent lines and ends with
//! reference, debit, credit and running balance:
//!   01-02-2025
//!   02-02-2025
//!   POS PURCHASE
//!   LULU HYPERMARKET
//!   FT25032XYZ
//!   150.00
//!   0.00
//!   4,850.00
//!
//! `pdftotext -layout` keeps the row on one line instead, with a wrapped
//! narrative continuing on the lines below:
//!   01-02-2025    02-02-2025    POS PURCHASE    FT25032XYZ    150.00    0.00    4,850.00
//!                               LULU HYPERMARKET

use regex::Regex;
use tally_core::Transaction;

use crate::extract::{BlockError, Extracted, FieldReader, collapse, preview, require_date};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::registry::Bank;
use crate::segment::{StartSignature, segment};
use crate::types::{Line, TransactionBlock};

// date, value date, reference, debit, credit, balance
const MIN_ITEMS: usize = 6;

pub struct AdibParser {
    noise: NoiseFilter,
    start: StartSignature,
}

impl AdibParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new()
                .pattern(
                    r"(?i)^(transaction date|value date|narrative|transaction reference|debit|credit|running balance)$",
                )
                .pattern(r"(?i)^transaction date value date narrative")
                .pattern(r"(?i)^page\s*\d+(\s*of\s*\d+)?$"),
            start: StartSignature::AnyOf(vec![
                StartSignature::AdjacentLines(Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("valid ADIB start regex")),
                StartSignature::Line(
                    Regex::new(r"^\d{2}-\d{2}-\d{4} \d{2}-\d{2}-\d{4}\b").expect("valid ADIB layout start regex"),
                ),
            ]),
        }
    }
}

impl Default for AdibParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for AdibParser {
    fn bank(&self) -> Bank {
        Bank::Adib
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["abu dhabi islamic bank", "adib.ae"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        segment(lines, &self.start)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let Some(first) = block.first() else {
            return Err(BlockError::Empty);
        };

        // Layout form: the whole row is on the first line and later lines
        // only continue the narrative
        let (items, wrapped): (Vec<&str>, Vec<&str>) = if first.cells.len() >= MIN_ITEMS {
            (first.cell_texts(), block.lines[1..].iter().map(|l| l.text.as_str()).collect())
        } else {
            (block.lines.iter().flat_map(|l| l.cell_texts()).collect(), Vec::new())
        };
        if items.len() < MIN_ITEMS {
            return Err(BlockError::TooFewCells {
                expected: MIN_ITEMS,
                found: items.len(),
                preview: preview(&block.joined()),
            });
        }

        let n = items.len();
        let (reference, debit, credit, balance) = (items[n - 4], items[n - 3], items[n - 2], items[n - 1]);
        if balance.to_lowercase().contains("page") {
            return Err(BlockError::NotATransaction {
                reason: format!("page marker in balance cell {balance:?}"),
            });
        }

        let date = require_date(items[0])?;
        let value_date = require_date(items[1])?;
        let narrative = collapse(&items[2..n - 4].iter().chain(&wrapped).copied().collect::<Vec<_>>().join(" "));

        let mut reader = FieldReader::new();
        let debit = reader.amount("debit", debit);
        let credit = reader.amount("credit", credit);
        let balance = reader.amount("balance", balance);

        let txn = Transaction::new(date, narrative, source_file)
            .with_value_date(Some(value_date))
            .with_split(debit, credit)
            .with_balance(balance)
            .with_reference(Some(reference.to_string()));
        Ok(reader.finish(txn))
    }
}
