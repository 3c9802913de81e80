//! RAKBANK current account statement parser (text)
//!
//! Expected extracted-text section:
//!   Date          Description                          Amount      Balance
//!   05-Mar-2025   FUNDS TRANSFER FROM J DOE            1,000.00    6,250.00
//!                 REF 0098812
//!
//! The statement does not split debits from credits, so direction comes from
//! a `Cr`/`Dr` marker next to the amount when printed, else from keywords.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::Transaction;

use crate::extract::{
    BlockError, Direction, Extracted, direction_from_keywords, leading_dates, marker_after, preview, require_date,
    trailing_figures,
};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::registry::Bank;
use crate::segment::{StartSignature, segment};
use crate::types::{Line, TransactionBlock};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}-[A-Za-z]{3}-\d{4}").expect("valid RAK date regex"));

pub struct RakParser {
    noise: NoiseFilter,
    start: StartSignature,
}

impl RakParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new().phrases(&[
                "page",
                "date issued",
                "your current account transactions",
                "account type: current account",
                "الإصدار",
                "مدة الكشف",
            ]),
            start: StartSignature::Line(Regex::new(r"^\d{2}-[A-Za-z]{3}-\d{4}").expect("valid RAK start regex")),
        }
    }
}

impl Default for RakParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for RakParser {
    fn bank(&self) -> Bank {
        Bank::Rak
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["rakbank", "national bank of ras al khaimah", "your current account transactions"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        segment(lines, &self.start)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let text = block.joined();
        let (dates, rest) = leading_dates(&text, &DATE_RE, 1);
        let raw_date = dates.first().ok_or_else(|| BlockError::MissingDate {
            preview: preview(&text),
        })?;
        let date = require_date(raw_date)?;

        let (figures, description) = trailing_figures(rest, 2)?;
        let (amount, balance) = (&figures[0], &figures[1]);

        let direction = marker_after(rest, amount).unwrap_or_else(|| direction_from_keywords(&description));
        let value = amount.value.abs();
        let (debit, credit) = match direction {
            Direction::Debit => (Some(value), None),
            Direction::Credit => (None, Some(value)),
        };

        let txn = Transaction::new(date, description, source_file)
            .with_split(debit, credit)
            .with_balance(Some(balance.value));
        Ok(Extracted::clean(txn))
    }
}
