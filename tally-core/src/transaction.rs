//! Ledger record types produced by statement extraction

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;

/// One ledger entry extracted from a statement.
///
/// Split-column banks fill `debit`/`credit` (at most one per row). Banks that
/// only print a running balance get `amount` from reconciliation, and in that
/// case `balance` is the authoritative figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction (posting) date
    pub date: NaiveDate,
    /// Value date, when the statement prints one
    pub value_date: Option<NaiveDate>,
    /// Whitespace-normalized narrative
    pub description: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    /// Signed amount: positive = money in, negative = money out
    pub amount: Option<f64>,
    /// Running balance after this transaction
    pub balance: Option<f64>,
    /// Cheque number or bank reference
    pub reference: Option<String>,
    pub currency: Option<String>,
    pub account: Option<String>,
    /// File the record was extracted from
    pub source_file: String,
    /// Set by the categorization matcher
    pub category: Option<String>,
}

impl Transaction {
    /// Create a record with only the mandatory fields set
    pub fn new(date: NaiveDate, description: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            date,
            value_date: None,
            description: description.into(),
            debit: None,
            credit: None,
            amount: None,
            balance: None,
            reference: None,
            currency: None,
            account: None,
            source_file: source_file.into(),
            category: None,
        }
    }

    pub fn with_value_date(mut self, value_date: Option<NaiveDate>) -> Self {
        self.value_date = value_date;
        self
    }

    /// Set debit/credit columns. A zero on either side counts as empty so
    /// that at most one side is populated.
    pub fn with_split(mut self, debit: Option<f64>, credit: Option<f64>) -> Self {
        self.debit = debit.filter(|v| *v != 0.0);
        self.credit = credit.filter(|v| *v != 0.0);
        if self.debit.is_some() && self.credit.is_some() {
            // Both columns printed: keep the larger, the other is a layout artifact.
            let (d, c) = (self.debit.unwrap_or(0.0), self.credit.unwrap_or(0.0));
            if d >= c {
                self.credit = None;
            } else {
                self.debit = None;
            }
        }
        self
    }

    pub fn with_amount(mut self, amount: Option<f64>) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_balance(mut self, balance: Option<f64>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference.filter(|r| !r.trim().is_empty());
        self
    }

    /// Signed movement of money: explicit amount first, then credit - debit.
    pub fn net_amount(&self) -> Option<f64> {
        if let Some(a) = self.amount {
            return Some(a);
        }
        match (self.debit, self.credit) {
            (None, None) => None,
            (d, c) => Some(c.unwrap_or(0.0) - d.unwrap_or(0.0)),
        }
    }

    /// Returns true if money left the account
    pub fn is_outflow(&self) -> bool {
        self.net_amount().is_some_and(|a| a < 0.0)
    }
}

/// Extraction output for one statement file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    pub source_file: String,
    /// Registry id of the bank parser that produced the rows, if any
    pub bank: Option<String>,
    /// Rows in print order
    pub transactions: Vec<Transaction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StatementResult {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            bank: None,
            transactions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Last running balance printed on the statement
    pub fn closing_balance(&self) -> Option<f64> {
        self.transactions.iter().rev().find_map(|t| t.balance)
    }
}

/// Output of a whole extraction batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// One entry per input file, in input order
    pub statements: Vec<StatementResult>,
    /// Batch-level diagnostics that are not tied to a single file
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchResult {
    /// All transactions across files, in input order
    pub fn combined(&self) -> Vec<Transaction> {
        self.statements
            .iter()
            .flat_map(|s| s.transactions.iter().cloned())
            .collect()
    }

    pub fn all_diagnostics(&self) -> Vec<&Diagnostic> {
        self.statements
            .iter()
            .flat_map(|s| s.diagnostics.iter())
            .chain(self.diagnostics.iter())
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.statements.iter().map(|s| s.transactions.len()).sum()
    }

    /// Files that produced no transactions at all
    pub fn failed_files(&self) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|s| s.transactions.is_empty())
            .map(|s| s.source_file.as_str())
            .collect()
    }
}
