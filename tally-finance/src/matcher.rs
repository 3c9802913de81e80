//! Keyword categorization.
//!
//! Substring match of the normalized description against the master table,
//! in table order. First match wins; no match is `Uncategorized`.

use std::io::{Read, Write};

use tally_core::Transaction;
use tracing::debug;

use crate::error::CategorizeError;
use crate::keywords::MasterKeywordTable;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Name of the column appended to categorized statement CSVs
pub const CATEGORY_COLUMN: &str = "Categorization";

const DESCRIPTION_NAMES: &[&str] = &[
    "description",
    "details",
    "narration",
    "particulars",
    "transaction details",
    "remarks",
];

/// Lowercase, unify en/em dashes to `-`, collapse whitespace
pub fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn categorize_description<'a>(description: &str, table: &'a MasterKeywordTable) -> &'a str {
    let cleaned = clean_text(description);
    table
        .rows()
        .iter()
        .find(|row| cleaned.contains(row.keyword.as_str()))
        .map(|row| row.category.as_str())
        .unwrap_or(UNCATEGORIZED)
}

/// Set `category` on every transaction
pub fn categorize_transactions(transactions: &mut [Transaction], table: &MasterKeywordTable) {
    for txn in transactions.iter_mut() {
        txn.category = Some(categorize_description(&txn.description, table).to_string());
    }
}

/// Index of the first column whose name looks like a description
pub fn find_description_column<S: AsRef<str>>(columns: &[S]) -> Option<usize> {
    columns.iter().position(|c| {
        let name = c.as_ref().to_lowercase();
        DESCRIPTION_NAMES.iter().any(|d| name.contains(d))
    })
}

/// Outcome of categorizing one statement CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReport {
    pub description_column: String,
    pub rows: usize,
    pub uncategorized: usize,
}

/// Copy a statement CSV to `writer` with a `Categorization` column appended.
///
/// Fails with [`CategorizeError::NoDescriptionColumn`] before writing
/// anything when no description-like column exists.
pub fn categorize_csv<R: Read, W: Write>(
    reader: R,
    writer: W,
    table: &MasterKeywordTable,
) -> Result<CsvReport, CategorizeError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let columns: Vec<&str> = headers.iter().collect();
    let Some(desc_col) = find_description_column(&columns) else {
        return Err(CategorizeError::NoDescriptionColumn {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
    };

    let mut wtr = csv::Writer::from_writer(writer);
    let mut out_headers = headers.clone();
    out_headers.push_field(CATEGORY_COLUMN);
    wtr.write_record(&out_headers)?;

    let mut report = CsvReport {
        description_column: headers.get(desc_col).unwrap_or_default().to_string(),
        rows: 0,
        uncategorized: 0,
    };

    for record in rdr.records() {
        let mut record = record?;
        let category = categorize_description(record.get(desc_col).unwrap_or(""), table);
        if category == UNCATEGORIZED {
            report.uncategorized += 1;
        }
        // short rows are padded so the new column lines up
        while record.len() < headers.len() {
            record.push_field("");
        }
        record.push_field(category);
        wtr.write_record(&record)?;
        report.rows += 1;
    }
    wtr.flush()?;

    debug!(
        column = %report.description_column,
        rows = report.rows,
        uncategorized = report.uncategorized,
        "statement categorized"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table() -> MasterKeywordTable {
        MasterKeywordTable::from_rows([
            ("amazon", "Shopping"),
            ("amazon prime", "Subscriptions"),
            ("enoc", "Fuel"),
            ("salary", "Income"),
        ])
    }

    #[test]
    fn test_first_row_wins() {
        assert_eq!(categorize_description("AMAZON PRIME MEMBERSHIP", &table()), "Shopping");
    }

    #[test]
    fn test_no_match_is_uncategorized() {
        assert_eq!(categorize_description("ZOOM.US 888-799", &table()), UNCATEGORIZED);
    }

    #[test]
    fn test_description_whitespace_and_case() {
        assert_eq!(categorize_description("  POS   Enoc\tStation 102 ", &table()), "Fuel");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Top–Up   —  WALLET "), "top-up - wallet");
    }

    #[test]
    fn test_find_description_column() {
        let cols = ["Txn Date", "Narration", "Debit", "Credit", "Balance"];
        assert_eq!(find_description_column(&cols), Some(1));
        assert_eq!(find_description_column(&["Transaction Details", "Remarks"]), Some(0));
        assert_eq!(find_description_column(&["Date", "Amount"]), None);
    }

    #[test]
    fn test_categorize_transactions() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut txns = vec![
            Transaction::new(date, "SALARY ACME", "a.pdf"),
            Transaction::new(date, "CASH", "a.pdf"),
        ];
        categorize_transactions(&mut txns, &table());
        assert_eq!(txns[0].category.as_deref(), Some("Income"));
        assert_eq!(txns[1].category.as_deref(), Some(UNCATEGORIZED));
    }

    #[test]
    fn test_categorize_csv_appends_column() {
        let input = "Date,Details,Amount\n01/01/2025,ENOC 1021,-50.00\n02/01/2025,Gym,-200\n";
        let mut out = Vec::new();
        let report = categorize_csv(input.as_bytes(), &mut out, &table()).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.uncategorized, 1);
        assert_eq!(report.description_column, "Details");

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Details,Amount,Categorization");
        assert_eq!(lines[1], "01/01/2025,ENOC 1021,-50.00,Fuel");
        assert_eq!(lines[2], "02/01/2025,Gym,-200,Uncategorized");
    }

    #[test]
    fn test_categorize_csv_without_description_column() {
        let input = "Date,Amount\n01/01/2025,5.00\n";
        let mut out = Vec::new();
        let err = categorize_csv(input.as_bytes(), &mut out, &table()).unwrap_err();
        assert!(matches!(err, CategorizeError::NoDescriptionColumn { .. }));
        assert!(out.is_empty());
    }
}
