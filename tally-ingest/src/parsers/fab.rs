//! First Abu Dhabi Bank statement parser (text)
//!
//! Rows open with the transaction and value dates on one line:
//!   01 Feb 2025  02 Feb 2025  POS ALDI DUBAI   12.00   900.00
//! The first figure is the movement, the second the running balance. Which
//! column the movement was printed in is lost in the text layer, so signed
//! amounts come from balance reconciliation.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::{Transaction, cut_token, find_decimal_tokens};

use crate::extract::{BlockError, Extracted, leading_dates, preview, require_date};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::registry::Bank;
use crate::segment::{StartSignature, segment};
use crate::types::{Line, TransactionBlock};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2} [A-Za-z]{3} \d{4}").expect("valid FAB date regex"));

pub struct FabParser {
    noise: NoiseFilter,
    start: StartSignature,
}

impl FabParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new()
                .phrases(&[
                    "Important:",
                    "*T&Cs Apply",
                    "600 52 5500",
                    "First Abu Dhabi Bank PJSC",
                    "We shall endeavor",
                    "P.O.BOX",
                    "IBAN",
                    "Old Account Number",
                    "Account Statement FROM",
                    "Sheet no",
                    "Balance brought forward",
                ])
                .pattern(r"(?i)^date value date description debit credit balance$"),
            start: StartSignature::Line(
                Regex::new(r"^\d{1,2} [A-Za-z]{3} \d{4}\s+\d{1,2} [A-Za-z]{3} \d{4}").expect("valid FAB start regex"),
            ),
        }
    }
}

impl Default for FabParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for FabParser {
    fn bank(&self) -> Bank {
        Bank::Fab
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["first abu dhabi bank", "bankfab.com"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        segment(lines, &self.start)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let text = block.joined();
        let (dates, rest) = leading_dates(&text, &DATE_RE, 2);
        if dates.len() < 2 {
            return Err(BlockError::MissingDate {
                preview: preview(&text),
            });
        }
        let date = require_date(dates[0])?;
        let value_date = require_date(dates[1])?;

        let figures = find_decimal_tokens(rest);
        let balance = match figures.len() {
            0 => {
                return Err(BlockError::MissingFigures {
                    expected: 1,
                    found: 0,
                    preview: preview(rest),
                });
            }
            1 => None,
            _ => Some(figures[1].value),
        };

        // Cut back to front so earlier offsets stay valid
        let mut description = rest.to_string();
        for token in figures.iter().take(2).rev() {
            description = cut_token(&description, token);
        }

        let txn = Transaction::new(date, description, source_file)
            .with_value_date(Some(value_date))
            .with_balance(balance);
        Ok(Extracted::clean(txn))
    }

    fn needs_reconciliation(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_lines;
    use crate::types::RawLine;
    use chrono::NaiveDate;

    fn parse(text: &str) -> Vec<Transaction> {
        let parser = FabParser::new();
        let raw: Vec<RawLine> = text.lines().map(|l| RawLine::new(l, 0, "fab1.pdf")).collect();
        let lines = normalize_lines(&raw, parser.noise());
        parser
            .segment(&lines)
            .iter()
            .map(|b| parser.extract(b, "fab1.pdf").unwrap().transaction)
            .collect()
    }

    #[test]
    fn test_parse_fab_basic() {
        let text = r#"
First Abu Dhabi Bank PJSC
DATE VALUE DATE DESCRIPTION DEBIT CREDIT BALANCE
01 Feb 2025  02 Feb 2025  POS ALDI DUBAI   12.00   900.00
             CARD 4411
03 Feb 2025  03 Feb 2025  PROFIT 2.50% P.A.  5.25  905.25
"#;
        let rows = parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(rows[0].value_date, NaiveDate::from_ymd_opt(2025, 2, 2));
        assert_eq!(rows[0].description, "POS ALDI DUBAI CARD 4411");
        assert_eq!(rows[0].balance, Some(900.0));
        assert_eq!(rows[0].amount, None);

        // percentages are not figures
        assert_eq!(rows[1].balance, Some(905.25));
        assert_eq!(rows[1].description, "PROFIT 2.50% P.A.");
    }

    #[test]
    fn test_single_figure_has_no_balance() {
        let rows = parse("04 Feb 2025 04 Feb 2025 CHARGE 10.00");
        assert_eq!(rows[0].balance, None);
        assert_eq!(rows[0].description, "CHARGE");
    }
}
