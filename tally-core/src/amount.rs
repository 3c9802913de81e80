//! Numeric token parsing for statement amounts and balances.
//!
//! Statements print figures as `1,234.56`, `-15.00`, `(15.00)`, `250.00 Cr`
//! or `AED 10.00`. Everything here works on already digit-normalized text.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static DECIMAL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{1,2}").expect("valid decimal token regex")
});

/// A figure that was present but could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed number: {raw:?}")]
pub struct MalformedNumber {
    pub raw: String,
}

/// Round to currency minor-unit precision
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a printed figure.
///
/// Empty cells and placeholder dashes are `Ok(None)`; anything else that is
/// not a number is an error so the caller can record it.
pub fn parse_amount(raw: &str) -> Result<Option<f64>, MalformedNumber> {
    let mut s = raw.trim().to_string();
    if s.is_empty() || s == "-" || s == "--" {
        return Ok(None);
    }

    let mut negative = false;

    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].trim().to_string();
    }

    // Trailing Cr/Dr markers (case-insensitive, optional dot)
    for (suffix, is_debit) in [("cr.", false), ("cr", false), ("dr.", true), ("dr", true)] {
        let cut = s.len().saturating_sub(suffix.len());
        if s.get(cut..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)) {
            s.truncate(cut);
            s = s.trim_end().to_string();
            if is_debit {
                negative = true;
            }
            break;
        }
    }

    // Leading/trailing ISO currency code
    let s = strip_currency_code(&s);

    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    let cleaned = cleaned.trim_start_matches('+');
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(MalformedNumber { raw: raw.to_string() });
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| MalformedNumber { raw: raw.to_string() })?;

    Ok(Some(if negative { -value.abs() } else { value }))
}

fn strip_currency_code(s: &str) -> &str {
    let s = s.trim();
    let is_code = |part: Option<&str>| part.is_some_and(|p| p.chars().all(|c| c.is_ascii_uppercase()));
    if s.len() > 3 {
        if is_code(s.get(..3)) {
            return s[3..].trim_start();
        }
        let cut = s.len() - 3;
        if is_code(s.get(cut..)) {
            return s[..cut].trim_end();
        }
    }
    s
}

/// A decimal figure found inside free text
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalToken {
    /// Byte offset of the token in the scanned text
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub value: f64,
}

/// Find decimal figures (`1,234.56`, `-0.50`) in free text, left to right.
///
/// A match glued to other digits, or directly followed by `%`, is not a
/// figure (account numbers, interest rates).
pub fn find_decimal_tokens(text: &str) -> Vec<DecimalToken> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();

    for m in DECIMAL_TOKEN_RE.find_iter(text) {
        let (start, end) = (m.start(), m.end());

        if start > 0 {
            let prev = bytes[start - 1];
            if prev.is_ascii_digit() || prev == b'.' || prev == b',' {
                continue;
            }
        }
        if end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            continue;
        }
        if text[end..].trim_start().starts_with('%') {
            continue;
        }

        let raw = m.as_str().to_string();
        let Ok(value) = raw.replace(',', "").parse::<f64>() else {
            continue;
        };
        out.push(DecimalToken { start, end, raw, value });
    }

    out
}

/// Remove a token from text and re-collapse the whitespace around it
pub fn cut_token(text: &str, token: &DecimalToken) -> String {
    let mut s = String::with_capacity(text.len());
    s.push_str(&text[..token.start]);
    s.push(' ');
    s.push_str(&text[token.end..]);
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
