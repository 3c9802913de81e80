//! Mashreq statement parser (text)
//!
//! A row opens at the first line carrying an ISO date and runs until the
//! next one. Only the running balance (the last figure in the row) is taken;
//! amounts come from balance reconciliation.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::{DecimalToken, Transaction, cut_token, find_decimal_tokens};

use crate::extract::{BlockError, Extracted, collapse, preview, require_date};
use crate::normalize::NoiseFilter;
use crate::parser::BankParser;
use crate::registry::Bank;
use crate::segment::{StartSignature, segment};
use crate::types::{Line, TransactionBlock};

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid Mashreq date regex"));

// A zero balance is printed as a bare `0`
static ZERO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)(0)(?:\s|$)").expect("valid zero regex"));

pub struct MashreqParser {
    noise: NoiseFilter,
    start: StartSignature,
}

impl MashreqParser {
    pub fn new() -> Self {
        Self {
            noise: NoiseFilter::new()
                .phrases(&[
                    "Opening balance",
                    "Closing balance",
                    "ﺍﻟﺘﺎﺭﻳﺦ",
                    "ﺍﻟﻤﻌﺎﻣﻠﺔ",
                    "ﺭﻗﻢ ﺍﻟﻤﺮﺟﻊ",
                    "ﻗﻴﻮﺩ",
                    "ﺍﻟﺮﺻﻴﺪ",
                    "page",
                    "The items and balance shown",
                    "of the statement date",
                    "All charges, terms and conditions",
                    "Please note that for foreign currency",
                    "verified. Report any discrepancies",
                    "accurate.",
                    "indicative only",
                    "ﺍﻟﺮﺟﺎﺀ ﺍﻟﺘﺄﻛﺪ ﻣﻦ ﺻﺤﺔ ﺍﻟﻤﻌﺎﻣﻼﺕ ﻭﺍﻟﻤﺒﺎﻟﻎ ﺍﻟﻤﺒﻴﻨﺔ ﻏﻰ ﻫﺬﺍ ﺍﻟﻜﺸﻒ",
                ])
                .pattern(r"(?i)\bof\s*\d+\b")
                .pattern(r"(?i)^date\s+transaction\s+reference"),
            start: StartSignature::Line(ISO_DATE_RE.clone()),
        }
    }
}

impl Default for MashreqParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankParser for MashreqParser {
    fn bank(&self) -> Bank {
        Bank::Mashreq
    }

    fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    fn signature(&self) -> &[&'static str] {
        &["mashreq"]
    }

    fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        segment(lines, &self.start)
    }

    fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let first = block.first().ok_or(BlockError::Empty)?;
        let found = ISO_DATE_RE.find(&first.text).ok_or_else(|| BlockError::MissingDate {
            preview: preview(&first.text),
        })?;
        let date = require_date(found.as_str())?;

        let text = block.joined();
        let without_date = collapse(&format!("{} {}", &text[..found.start()], &text[found.end()..]));

        let balance = last_figure(&without_date).ok_or_else(|| BlockError::MissingFigures {
            expected: 1,
            found: 0,
            preview: preview(&without_date),
        })?;
        let description = cut_token(&without_date, &balance);

        let txn = Transaction::new(date, description, source_file).with_balance(Some(balance.value));
        Ok(Extracted::clean(txn))
    }

    fn needs_reconciliation(&self) -> bool {
        true
    }
}

/// Rightmost decimal figure or bare zero
fn last_figure(text: &str) -> Option<DecimalToken> {
    let decimal = find_decimal_tokens(text).pop();
    let zero = ZERO_RE.captures_iter(text).filter_map(|c| c.get(1)).last();

    match (decimal, zero) {
        (decimal, Some(z)) if decimal.as_ref().is_none_or(|d| z.start() > d.end) => Some(DecimalToken {
            start: z.start(),
            end: z.end(),
            raw: z.as_str().to_string(),
            value: 0.0,
        }),
        (decimal, _) => decimal,
    }
}
