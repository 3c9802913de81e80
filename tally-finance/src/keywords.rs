//! Master keyword table: ordered (keyword, category) rows.
//!
//! The table is maintained as a spreadsheet with `Key Word` and `Category`
//! columns; it is read here from its CSV export.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CategorizeError;
use crate::matcher::clean_text;

pub const KEYWORD_HEADER: &str = "Key Word";
pub const CATEGORY_HEADER: &str = "Category";

/// One matching rule; `keyword` is already normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub category: String,
}

/// Keyword rules in priority order (first match wins)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKeywordTable {
    rows: Vec<KeywordRow>,
}

impl MasterKeywordTable {
    /// Build from raw pairs; keywords are normalized and blanks dropped
    pub fn from_rows<K, C>(rows: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: AsRef<str>,
        C: Into<String>,
    {
        let rows = rows
            .into_iter()
            .filter_map(|(keyword, category)| {
                let keyword = clean_text(keyword.as_ref());
                if keyword.is_empty() {
                    return None;
                }
                Some(KeywordRow {
                    keyword,
                    category: category.into().trim().to_string(),
                })
            })
            .collect();
        Self { rows }
    }

    /// Read the CSV export. Columns are found by header name, so extra
    /// columns and any column order are fine.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CategorizeError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(CategorizeError::MissingColumn(name))
        };
        let keyword_col = position(KEYWORD_HEADER)?;
        let category_col = position(CATEGORY_HEADER)?;

        let mut pairs = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let keyword = record.get(keyword_col).unwrap_or("").to_string();
            let category = record.get(category_col).unwrap_or("").to_string();
            pairs.push((keyword, category));
        }
        Ok(Self::from_rows(pairs))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, CategorizeError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn rows(&self) -> &[KeywordRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_by_header_name() {
        let csv = "Category,Notes,Key Word\nShopping,,AMAZON\nFuel,station,  ENOC   Dubai \nGroceries,,\n";
        let table = MasterKeywordTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].keyword, "amazon");
        assert_eq!(table.rows()[1].keyword, "enoc dubai");
        assert_eq!(table.rows()[1].category, "Fuel");
    }

    #[test]
    fn test_missing_column() {
        let err = MasterKeywordTable::from_csv_reader("Keyword,Category\nx,y\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CategorizeError::MissingColumn("Key Word")));
    }

    #[test]
    fn test_keyword_dashes_normalized() {
        let table = MasterKeywordTable::from_rows([("E–Wallet — Top Up", "Transfers")]);
        assert_eq!(table.rows()[0].keyword, "e-wallet - top up");
    }
}
