//! Statement date parsing.
//!
//! Banks print dates as `05-03-2025`, `05/03/2025`, `2025-03-05`,
//! `05-Mar-2025`, `5 Mar 2025` or `05/03/25`. All of them are day-first.

use chrono::{Datelike, NaiveDate};

const FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%m-%y",
    "%d/%m/%y",
    "%d.%m.%Y",
];

/// Parse a day-first statement date in any of the known layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.is_empty() {
        return None;
    }
    // `%Y` happily reads "25" as year 25, so two-digit years must fall
    // through to the `%y` layouts.
    FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&s, fmt)
            .ok()
            .filter(|d| d.year() >= 1900)
    })
}

/// True when every date is on or after the one before it
pub fn is_chronological(dates: impl IntoIterator<Item = NaiveDate>) -> bool {
    let mut prev: Option<NaiveDate> = None;
    for d in dates {
        if prev.is_some_and(|p| d < p) {
            return false;
        }
        prev = Some(d);
    }
    true
}
