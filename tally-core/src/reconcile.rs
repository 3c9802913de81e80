//! Derive signed amounts from running-balance deltas.
//!
//! `amount[i] = balance[i] - balance[i-1]`, and for the first row
//! `balance[0] - opening` when an opening balance is known. Only valid while
//! rows stay in print order, so out-of-order input is refused.

use chrono::NaiveDate;
use thiserror::Error;

use crate::amount::round2;
use crate::dates::is_chronological;
use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("row {index} dated {date} is earlier than the row before it")]
    OutOfOrder { index: usize, date: NaiveDate },
}

/// Fill `amount` from consecutive balances, in place.
///
/// Rows without a balance keep `amount = None`; the next row with a balance
/// is diffed against the last balance seen.
pub fn reconcile(txns: &mut [Transaction], opening_balance: Option<f64>) -> Result<(), ReconcileError> {
    if !is_chronological(txns.iter().map(|t| t.date)) {
        let index = txns
            .windows(2)
            .position(|w| w[1].date < w[0].date)
            .map(|i| i + 1)
            .unwrap_or(0);
        return Err(ReconcileError::OutOfOrder {
            index,
            date: txns[index].date,
        });
    }

    let mut prev = opening_balance;
    for t in txns.iter_mut() {
        match t.balance {
            Some(b) => {
                t.amount = prev.map(|p| round2(b - p));
                prev = Some(b);
            }
            None => t.amount = None,
        }
    }

    Ok(())
}

/// Pure form of [`reconcile`] over a bare balance sequence
pub fn balance_deltas(balances: &[f64], opening_balance: Option<f64>) -> Vec<Option<f64>> {
    let mut prev = opening_balance;
    balances
        .iter()
        .map(|b| {
            let amount = prev.map(|p| round2(b - p));
            prev = Some(*b);
            amount
        })
        .collect()
}
