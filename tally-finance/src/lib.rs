//! tally-finance: keyword categorization, ledger CSV, and category summaries

pub mod error;
pub mod keywords;
pub mod ledger_csv;
pub mod master_source;
pub mod matcher;
pub mod summary;

pub use error::CategorizeError;
pub use keywords::{KeywordRow, MasterKeywordTable};
pub use ledger_csv::{read_transactions, write_transactions, write_transactions_to_path};
pub use master_source::{DEFAULT_MASTER_URL, FetchPolicy, MasterSource, load_master_table};
pub use matcher::{
    CATEGORY_COLUMN, CsvReport, UNCATEGORIZED, categorize_csv, categorize_description, categorize_transactions,
    clean_text, find_description_column,
};
pub use summary::{CategorySummary, summarize};
