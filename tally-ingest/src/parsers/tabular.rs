//! Shared row extraction for banks that print a ruled transaction table

use tally_core::{Transaction, parse_date};

use crate::extract::{BlockError, Extracted, FieldReader, collapse, preview, require_date};
use crate::table::{Column, ColumnLayout, TableRows, row_description, table_rows};
use crate::types::{Line, TransactionBlock};

const SUMMARY_ROWS: &[&str] = &["opening balance", "balance brought forward", "closing balance", "total"];

/// Table shape of one bank
pub struct TableSpec {
    /// Header labels used to locate columns
    pub header: &'static [(&'static str, Column)],
    /// Column order when no header was found above a row
    pub positional: &'static [Column],
}

impl TableSpec {
    pub fn segment(&self, lines: &[Line]) -> Vec<TransactionBlock> {
        let is_row_start = |l: &Line| parse_date(l.cell(0)).is_some();
        let is_terminator = |l: &Line| {
            let lower = l.text.to_lowercase();
            lower.starts_with("closing balance") || lower.starts_with("total")
        };
        table_rows(
            lines,
            &TableRows {
                header: self.header,
                is_row_start: &is_row_start,
                is_terminator: &is_terminator,
            },
        )
    }

    pub fn extract(&self, block: &TransactionBlock, source_file: &str) -> Result<Extracted, BlockError> {
        let first = block.first().ok_or(BlockError::Empty)?;
        let row = match &block.context.columns {
            Some(layout) => by_layout(block, first, layout),
            None => self.by_position(block, first)?,
        };

        let lower = row.description.to_lowercase();
        if SUMMARY_ROWS.iter().any(|s| lower.starts_with(s)) {
            return Err(BlockError::NotATransaction {
                reason: format!("summary row {:?}", preview(&row.description)),
            });
        }

        // A date cell glued to its neighbour still starts the first cell
        let date = match parse_date(&row.date) {
            Some(d) => d,
            None => require_date(first.cell(0))?,
        };
        let value_date = row.value_date.as_deref().and_then(parse_date);

        let mut reader = FieldReader::new();
        let debit = reader.amount("debit", &row.debit);
        let credit = reader.amount("credit", &row.credit);
        let balance = reader.amount("balance", &row.balance);

        if debit.is_none() && credit.is_none() && balance.is_none() {
            return Err(BlockError::NotATransaction {
                reason: format!("no figures in {:?}", preview(&block.joined())),
            });
        }

        let txn = Transaction::new(date, row.description, source_file)
            .with_value_date(value_date)
            .with_split(debit.map(f64::abs), credit.map(f64::abs))
            .with_balance(balance)
            .with_reference(row.reference);

        Ok(reader.finish(txn))
    }

    fn by_position(&self, block: &TransactionBlock, first: &Line) -> Result<RowCells, BlockError> {
        let cells = first.cell_texts();
        if cells.len() < self.positional.len() {
            return Err(BlockError::TooFewCells {
                expected: self.positional.len(),
                found: cells.len(),
                preview: preview(&first.text),
            });
        }

        let mut row = RowCells::default();
        for (column, text) in self.positional.iter().zip(cells) {
            row.set(*column, text.to_string());
        }
        let wrapped: Vec<&str> = block.lines[1..].iter().map(|l| l.text.as_str()).collect();
        if !wrapped.is_empty() {
            row.description = collapse(&format!("{} {}", row.description, wrapped.join(" ")));
        }
        Ok(row)
    }
}

fn by_layout(block: &TransactionBlock, first: &Line, layout: &ColumnLayout) -> RowCells {
    let mut row = RowCells {
        date: layout.get(first, Column::Date),
        description: row_description(block, layout),
        debit: layout.get(first, Column::Debit),
        credit: layout.get(first, Column::Credit),
        balance: layout.get(first, Column::Balance),
        ..RowCells::default()
    };
    if layout.has(Column::ValueDate) {
        row.value_date = Some(layout.get(first, Column::ValueDate));
    }
    if layout.has(Column::Reference) {
        row.reference = Some(layout.get(first, Column::Reference));
    }
    row
}

#[derive(Debug, Default)]
struct RowCells {
    date: String,
    value_date: Option<String>,
    description: String,
    reference: Option<String>,
    debit: String,
    credit: String,
    balance: String,
}

impl RowCells {
    fn set(&mut self, column: Column, text: String) {
        match column {
            Column::Date => self.date = text,
            Column::ValueDate => self.value_date = Some(text),
            Column::Description => self.description = text,
            Column::Reference => self.reference = Some(text),
            Column::Debit => self.debit = text,
            Column::Credit => self.credit = text,
            Column::Balance => self.balance = text,
        }
    }
}
