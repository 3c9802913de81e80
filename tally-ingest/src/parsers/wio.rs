//! Wio Bank statement parser (text)
//!
//! One PDF can hold several accounts. Each account section opens with the
//! `ACCOUNT STATEMENT ACCOUNT HOLDER NAME ...` header; the account number and
//! currency found in a section are stamped on every row in it. Rows are
//! single lines with a signed amount:
//!   03/02/2025  P0012345  Card purchase NOON  -120.00  4,880.00

use regex::Regex;
use std::sync::LazyLock;
use tally_core::Transaction;

use crate::extract::{BlockError, Extracted, FieldReader, preview, require_date};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::registry::Bank;
use crate::types::{BlockContext, Line, TransactionBlock};

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)account\s+holder\s+name").expect("valid Wio section regex"));
static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{10})\b").expect("valid Wio account regex"));
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Current|Savings)\s+([A-Z]{3})\b").expect("valid Wio currency regex"));
static TXN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<date>\d{2}/\d{2}/\d{4})\s+",
        r"(?P<reference>\w+)\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>-?\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s+",
        r"(?P<balance>-?\d{1,3}(?:,\d{3})*(?:\.\d+)?)",
        r"(?:\s+[A-Z]{3})?\s*$"
    ))
    .expect("valid Wio row regex")
});

pub struct WioParser {
    noise: NoiseFilter,
}

impl WioParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new().pattern(r"(?i)^page\s+\d+\s+of\s+\d+$"),
        }
    }
}

impl Default for WioParser {
    fn default() -> Self {
        Self::new()
    }
}

fn section_context(section: &[Line]) -> BlockContext {
    let text = section.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n");
    BlockContext {
        account: ACCOUNT_RE.captures(&text).map(|c| c[1].to_string()),
        currency: CURRENCY_RE.captures(&text).map(|c| c[2].to_string()),
        columns: None,
    }
}

impl BankParser for WioParser {
    fn bank(&self) -> Bank {
        Bank::Wio
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["wio bank", "wio.io"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        let mut sections: Vec<&[Line]> = Vec::new();
        let mut start = 0;
        for (i, line) in lines.iter().enumerate() {
            if SECTION_RE.is_match(&line.text) && i > start {
                sections.push(&lines[start..i]);
                start = i;
            }
        }
        if start < lines.len() {
            sections.push(&lines[start..]);
        }

        let mut blocks = Vec::new();
        for section in sections {
            let context = section_context(section);
            blocks.extend(
                section
                    .iter()
                    .filter(|l| TXN_RE.is_match(&l.text))
                    .map(|l| TransactionBlock::new(vec![l.clone()]).with_context(context.clone())),
            );
        }
        blocks
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let line = block.first().ok_or(BlockError::Empty)?;
        let caps = TXN_RE.captures(&line.text).ok_or_else(|| BlockError::NotATransaction {
            reason: format!("not a Wio row: {:?}", preview(&line.text)),
        })?;

        let date = require_date(&caps["date"])?;
        let mut reader = FieldReader::new();
        let amount = reader.amount("amount", &caps["amount"]);
        let balance = reader.amount("balance", &caps["balance"]);

        let mut txn = Transaction::new(date, caps["desc"].trim(), source_file)
            .with_amount(amount)
            .with_balance(balance)
            .with_reference(Some(caps["reference"].to_string()));
        txn.currency = block.context.currency.clone();
        txn.account = block.context.account.clone();

        Ok(reader.finish(txn))
    }
}
