//! Abu Dhabi Commercial Bank statement parser (table)
//!
//! Columns are located from the header row, which must carry all seven
//! expected labels. The header repeats on every page and is skipped there.

use crate::extract::{BlockError, Extracted};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::parsers::tabular::TableSpec;
use crate::registry::Bank;
use crate::table::Column;
use crate::types::{Line, TransactionBlock};

const TABLE: TableSpec = TableSpec {
    header: &[
        ("Posting Date", Column::Date),
        ("Value Date", Column::ValueDate),
        ("Description", Column::Description),
        ("Ref/Cheque No", Column::Reference),
        ("Debit Amount", Column::Debit),
        ("Credit Amount", Column::Credit),
        ("Balance", Column::Balance),
    ],
    positional: &[
        Column::Date,
        Column::ValueDate,
        Column::Description,
        Column::Reference,
        Column::Debit,
        Column::Credit,
        Column::Balance,
    ],
};

pub struct AdcbParser {
    noise: NoiseFilter,
}

impl AdcbParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new().pattern(r"(?i)^page\s*\d+(\s*of\s*\d+)?$"),
        }
    }
}

impl Default for AdcbParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for AdcbParser {
    fn bank(&self) -> Bank {
        Bank::Adcb
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["abu dhabi commercial bank", "adcb.com", "ref/cheque no"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        TABLE.segment(lines)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        TABLE.extract(block, source_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_lines;
    use crate::types::RawLine;
    use tally_core::Transaction;

    fn parse(text: &str) -> Vec<Result<Extracted, BlockError>> {
        let parser = AdcbParser::new();
        let raw: Vec<RawLine> = text.lines().map(|l| RawLine::new(l, 0, "adcb.pdf")).collect();
        let lines = normalize_lines(&raw, parser.noise());
        parser
            .segment(&lines)
            .iter()
            .map(|b| parser.extract(b, "adcb.pdf"))
            .collect()
    }

    const HEADER: &str =
        "Posting Date  Value Date   Description             Ref/Cheque No   Debit Amount   Credit Amount   Balance";

    #[test]
    fn test_columns_follow_header() {
        let text = [
            "ADCB Statement",
            HEADER,
            "01/04/2025    01/04/2025   ETISALAT BILL           UT77812                  310.00                  2,690.00",
            "                           AUTO PAY",
            "Page 1 of 2",
            HEADER,
            "02/04/2025    02/04/2025   CASH DEPOSIT CDM        CD1                                     500.00   3,190.00",
        ]
        .join("\n");
        let rows: Vec<Transaction> = parse(&text).into_iter().map(|r| r.unwrap().transaction).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].description, "ETISALAT BILL AUTO PAY");
        assert_eq!(rows[0].reference.as_deref(), Some("UT77812"));
        assert_eq!(rows[0].debit, Some(310.0));
        assert_eq!(rows[0].balance, Some(2690.0));

        assert_eq!(rows[1].credit, Some(500.0));
        assert_eq!(rows[1].debit, None);
        assert_eq!(rows[1].value_date, chrono::NaiveDate::from_ymd_opt(2025, 4, 2));
    }

    #[test]
    fn test_opening_balance_row_is_skipped() {
        let text = [
            HEADER,
            "01/04/2025    01/04/2025   Opening Balance                                                          3,000.00",
        ]
        .join("\n");
        let rows = parse(&text);
        assert!(matches!(rows[0], Err(BlockError::NotATransaction { .. })));
    }
}
