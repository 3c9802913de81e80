//! Ledger CSV: the combined output of a conversion run.
//!
//! Columns: Date, Value Date, Description, Reference, Debit, Credit, Amount,
//! Balance, Currency, Account, Source File, Category. Dates are ISO 8601;
//! missing values are empty cells.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{Transaction, round2};

#[derive(Debug, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Value Date")]
    value_date: Option<NaiveDate>,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Reference")]
    reference: Option<String>,
    #[serde(rename = "Debit")]
    debit: Option<f64>,
    #[serde(rename = "Credit")]
    credit: Option<f64>,
    #[serde(rename = "Amount")]
    amount: Option<f64>,
    #[serde(rename = "Balance")]
    balance: Option<f64>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "Source File")]
    source_file: String,
    #[serde(rename = "Category")]
    category: Option<String>,
}

impl From<&Transaction> for LedgerRow {
    fn from(t: &Transaction) -> Self {
        Self {
            date: t.date,
            value_date: t.value_date,
            description: t.description.clone(),
            reference: t.reference.clone(),
            debit: t.debit.map(round2),
            credit: t.credit.map(round2),
            amount: t.amount.map(round2),
            balance: t.balance.map(round2),
            currency: t.currency.clone(),
            account: t.account.clone(),
            source_file: t.source_file.clone(),
            category: t.category.clone(),
        }
    }
}

impl From<LedgerRow> for Transaction {
    fn from(r: LedgerRow) -> Self {
        let mut t = Transaction::new(r.date, r.description, r.source_file)
            .with_value_date(r.value_date)
            .with_split(r.debit, r.credit)
            .with_amount(r.amount)
            .with_balance(r.balance)
            .with_reference(r.reference);
        t.currency = r.currency.filter(|s| !s.is_empty());
        t.account = r.account.filter(|s| !s.is_empty());
        t.category = r.category.filter(|s| !s.is_empty());
        t
    }
}

pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in transactions {
        wtr.serialize(LedgerRow::from(t))?;
    }
    if transactions.is_empty() {
        // serialize() writes the header with the first row only
        wtr.write_record([
            "Date",
            "Value Date",
            "Description",
            "Reference",
            "Debit",
            "Credit",
            "Amount",
            "Balance",
            "Currency",
            "Account",
            "Source File",
            "Category",
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<LedgerRow>().enumerate() {
        let row = row.with_context(|| format!("ledger row {}", i + 1))?;
        out.push(row.into());
    }
    Ok(out)
}

pub fn write_transactions_to_path(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_transactions(file, transactions)
}
