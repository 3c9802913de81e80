//! tally-core: ledger types, figure/date parsing and balance reconciliation

pub mod amount;
pub mod dates;
pub mod diagnostics;
pub mod reconcile;
pub mod transaction;

pub use amount::{DecimalToken, MalformedNumber, cut_token, find_decimal_tokens, parse_amount, round2};
pub use dates::{is_chronological, parse_date};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use reconcile::{ReconcileError, balance_deltas, reconcile};
pub use transaction::{BatchResult, StatementResult, Transaction};
