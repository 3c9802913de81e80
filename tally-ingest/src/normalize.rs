//! Line normalization: drop boilerplate, unify digit scripts, collapse whitespace.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{Cell, Line, RawLine};

// Words joined by single spaces; two or more spaces (or a tab) end a cell.
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s](?:[^\s]| [^\s])*").expect("valid cell regex"));

/// Boilerplate matcher for one bank layout.
///
/// A line is noise when it contains any phrase (case-insensitive), or
/// matches any pattern.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    phrases: Vec<String>,
    patterns: Vec<Regex>,
}

impl NoiseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phrases(mut self, phrases: &[&str]) -> Self {
        self.phrases
            .extend(phrases.iter().map(|p| normalize_digits(p).to_lowercase()));
        self
    }

    /// Add a regex. Panics on an invalid pattern; callers pass literals.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns
            .push(Regex::new(pattern).expect("valid noise pattern"));
        self
    }

    pub fn is_noise(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
            || self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// Map Arabic-Indic and Extended Arabic-Indic digits to ASCII, and the
/// Arabic decimal/thousands separators to `.` and `,`.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{066B}' => '.',
            '\u{066C}' => ',',
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            _ => c,
        })
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a layout line into cells at column gaps, keeping char columns
pub fn split_cells(text: &str) -> Vec<Cell> {
    let text = text.replace('\t', "  ");
    CELL_RE
        .find_iter(&text)
        .map(|m| {
            let start = text[..m.start()].chars().count();
            Cell {
                text: m.as_str().to_string(),
                start,
                end: start + m.as_str().chars().count(),
            }
        })
        .collect()
}

/// Normalize one raw line; `None` when it is blank or noise
pub fn normalize_line(raw: &RawLine, noise: &NoiseFilter) -> Option<Line> {
    let digits = normalize_digits(&raw.text);
    let text = collapse_whitespace(&digits);
    if text.is_empty() || noise.is_noise(&text) {
        return None;
    }
    Some(Line {
        text,
        cells: split_cells(&digits),
        page_index: raw.page_index,
    })
}

/// Normalize a statement's lines, keeping their order
pub fn normalize_lines(raw: &[RawLine], noise: &NoiseFilter) -> Vec<Line> {
    raw.iter().filter_map(|r| normalize_line(r, noise)).collect()
}
