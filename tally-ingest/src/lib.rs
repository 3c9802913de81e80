//! tally-ingest: statement PDF text extraction, line cleanup, and per-bank parsers.

pub mod extract;
pub mod normalize;
pub mod parser;
pub mod parsers;
pub mod pdf;
pub mod pipeline;
pub mod registry;
pub mod segment;
pub mod table;
pub mod types;

pub use extract::{BlockError, Extracted, FieldIssue};
pub use parser::BankParser;
pub use pdf::{PdfError, TextBackend};
pub use pipeline::{ExtractOptions, StatementInput, extract_batch, extract_from_text, extract_statement};
pub use registry::{Bank, UnknownBank, detect_bank, parser_for};
pub use types::{Line, RawLine, TransactionBlock};
