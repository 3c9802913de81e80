//! Per-category totals over categorized transactions

use serde::{Deserialize, Serialize};
use tally_core::{Transaction, round2};

use crate::matcher::UNCATEGORIZED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    /// Money out, as a positive figure
    pub total_debit: f64,
    pub total_credit: f64,
    /// Credits minus debits
    pub net: f64,
}

impl CategorySummary {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            count: 0,
            total_debit: 0.0,
            total_credit: 0.0,
            net: 0.0,
        }
    }

    fn add(&mut self, txn: &Transaction) {
        self.count += 1;
        if let Some(net) = txn.net_amount() {
            if net < 0.0 {
                self.total_debit += -net;
            } else {
                self.total_credit += net;
            }
            self.net += net;
        }
    }
}

/// Group by category, in order of first appearance.
///
/// Rows without a category count as `Uncategorized`; rows without any
/// amount are counted but add nothing to the totals.
pub fn summarize(transactions: &[Transaction]) -> Vec<CategorySummary> {
    let mut out: Vec<CategorySummary> = Vec::new();
    for txn in transactions {
        let category = txn.category.as_deref().unwrap_or(UNCATEGORIZED);
        match out.iter_mut().find(|s| s.category == category) {
            Some(summary) => summary.add(txn),
            None => {
                let mut summary = CategorySummary::new(category);
                summary.add(txn);
                out.push(summary);
            }
        }
    }

    for s in &mut out {
        s.total_debit = round2(s.total_debit);
        s.total_credit = round2(s.total_credit);
        s.net = round2(s.net);
    }
    out
}
