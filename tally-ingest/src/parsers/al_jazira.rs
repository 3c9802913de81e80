//! Al Jazira statement parser (table)
//!
//! Six fixed columns. Figures may be printed in Arabic-Indic digits, which
//! the line normalizer has already mapped to ASCII by the time rows get here.

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
        ("Description", Column::Description),
        ("Withdrawal", Column::Debit),
        ("Deposit", Column::Credit),
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

pub struct AlJaziraParser {
    noise: NoiseFilter,
}

impl AlJaziraParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new().pattern(r"(?i)^page\s*\d+(\s*of\s*\d+)?$"),
        }
    }
}

impl Default for AlJaziraParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for AlJaziraParser {
    fn bank(&self) -> Bank {
        Bank::AlJazira
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["bank al jazira", "al jazira bank", "baj.com.sa"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        TABLE.segment(lines)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        TABLE.extract(block, source_file)
    }
}
