//! Shared field-extraction helpers for bank parsers.
//!
//! A parser turns one [`TransactionBlock`] into a [`Transaction`] or a
//! [`BlockError`]. Figures that are present but unreadable are not block
//! failures: they become `None` and are reported as [`FieldIssue`]s.

use chrono::NaiveDate;
use regex::Regex;
use tally_core::{DecimalToken, Transaction, find_decimal_tokens, parse_amount, parse_date};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block is empty")]
    Empty,
    #[error("no date at start of block: {preview:?}")]
    MissingDate { preview: String },
    #[error("unparseable date {raw:?}")]
    BadDate { raw: String },
    #[error("expected {expected} figures, found {found}: {preview:?}")]
    MissingFigures {
        expected: usize,
        found: usize,
        preview: String,
    },
    #[error("row has {found} cells, layout needs {expected}: {preview:?}")]
    TooFewCells {
        expected: usize,
        found: usize,
        preview: String,
    },
    #[error("row is not a transaction: {reason}")]
    NotATransaction { reason: String },
}

/// A numeric cell that was coerced to missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub raw: String,
}

/// A successfully extracted row plus any coerced fields
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub transaction: Transaction,
    pub issues: Vec<FieldIssue>,
}

impl Extracted {
    pub fn clean(transaction: Transaction) -> Self {
        Self {
            transaction,
            issues: Vec::new(),
        }
    }
}

/// Reads numeric cells, remembering which ones were malformed
#[derive(Debug, Default)]
pub struct FieldReader {
    issues: Vec<FieldIssue>,
}

impl FieldReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&mut self, field: &'static str, raw: &str) -> Option<f64> {
        match parse_amount(raw) {
            Ok(v) => v,
            Err(_) => {
                self.issues.push(FieldIssue {
                    field,
                    raw: raw.trim().to_string(),
                });
                None
            }
        }
    }

    pub fn finish(self, transaction: Transaction) -> Extracted {
        Extracted {
            transaction,
            issues: self.issues,
        }
    }
}

/// Parse a date cell, as a block error when it fails
pub fn require_date(raw: &str) -> Result<NaiveDate, BlockError> {
    parse_date(raw).ok_or_else(|| BlockError::BadDate { raw: raw.to_string() })
}

/// Split up to `max` leading dates off a line.
///
/// Returns the raw date strings and the remainder of the line after the
/// last date, which seeds the description.
pub fn leading_dates<'a>(line: &'a str, date_re: &Regex, max: usize) -> (Vec<&'a str>, &'a str) {
    let mut dates = Vec::new();
    let mut rest = line.trim_start();

    while dates.len() < max {
        match date_re.find(rest) {
            Some(m) if m.start() == 0 => {
                dates.push(m.as_str());
                rest = rest[m.end()..].trim_start();
            }
            _ => break,
        }
    }

    (dates, rest)
}

/// Take the last `count` decimal figures out of a description.
///
/// Returns the figures in print order and the description truncated before
/// the first of them. Fewer figures than asked is an error.
pub fn trailing_figures(text: &str, count: usize) -> Result<(Vec<DecimalToken>, String), BlockError> {
    let tokens = find_decimal_tokens(text);
    if tokens.len() < count {
        return Err(BlockError::MissingFigures {
            expected: count,
            found: tokens.len(),
            preview: preview(text),
        });
    }
    let taken = tokens[tokens.len() - count..].to_vec();
    let description = match taken.first() {
        Some(first) => collapse(&text[..first.start]),
        None => collapse(text),
    };
    Ok((taken, description))
}

/// Money direction of a row whose amount is unsigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

const CREDIT_WORDS: &[&str] = &[
    "transfer from",
    "deposit",
    "credit",
    "funds transfer",
    "refund",
    "salary",
    "reversal",
];

const DEBIT_WORDS: &[&str] = &[
    "transfer to",
    "withdrawal",
    "purchase",
    "debit",
    "fee",
    "charge",
];

/// Best-effort direction from description keywords.
///
/// The keyword that occurs first in the description decides. A tie at the
/// same position, or no keyword at all, is a debit.
pub fn direction_from_keywords(description: &str) -> Direction {
    let lower = description.to_lowercase();
    let earliest = |words: &[&str]| words.iter().filter_map(|w| lower.find(w)).min();

    match (earliest(CREDIT_WORDS), earliest(DEBIT_WORDS)) {
        (Some(c), Some(d)) if c < d => Direction::Credit,
        (Some(_), None) => Direction::Credit,
        _ => Direction::Debit,
    }
}

/// Explicit `Cr`/`Dr` marker printed right after a figure
pub fn marker_after(text: &str, token: &DecimalToken) -> Option<Direction> {
    let after = text[token.end..].trim_start().to_lowercase();
    if after.starts_with("cr") {
        Some(Direction::Credit)
    } else if after.starts_with("dr") {
        Some(Direction::Debit)
    } else {
        None
    }
}

pub fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn preview(text: &str) -> String {
    let collapsed = collapse(text);
    if collapsed.chars().count() > 80 {
        let cut: String = collapsed.chars().take(77).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}
