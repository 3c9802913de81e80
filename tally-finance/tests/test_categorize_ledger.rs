use chrono::NaiveDate;
use tally_core::Transaction;
use tally_finance::{
    MasterKeywordTable, UNCATEGORIZED, categorize_csv, categorize_transactions, read_transactions, summarize,
    write_transactions,
};

const MASTER: &str = "\
Key Word,Category
CARREFOUR,Groceries
ENOC,Fuel
SALARY,Income
ETISALAT,Utilities
";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn ledger() -> Vec<Transaction> {
    vec![
        Transaction::new(day(1), "SALARY MARCH ACME LLC", "adcb.pdf").with_split(None, Some(12000.0)),
        Transaction::new(day(2), "POS CARREFOUR MOE", "adcb.pdf").with_split(Some(410.25), None),
        Transaction::new(day(3), "ENOC 1021 AL QUOZ", "adcb.pdf").with_split(Some(95.0), None),
        Transaction::new(day(5), "Carrefour  City Centre", "wio.pdf").with_amount(Some(-89.75)),
        Transaction::new(day(6), "TRANSFER TO SAVINGS", "wio.pdf").with_amount(Some(-2000.0)),
    ]
}

#[test]
fn test_categorize_then_summarize() {
    let table = MasterKeywordTable::from_csv_reader(MASTER.as_bytes()).unwrap();
    let mut txns = ledger();
    categorize_transactions(&mut txns, &table);

    let categories: Vec<&str> = txns.iter().map(|t| t.category.as_deref().unwrap()).collect();
    assert_eq!(categories, vec!["Income", "Groceries", "Fuel", "Groceries", UNCATEGORIZED]);

    let summary = summarize(&txns);
    assert_eq!(summary.len(), 4);
    let groceries = summary.iter().find(|s| s.category == "Groceries").unwrap();
    assert_eq!(groceries.count, 2);
    assert_eq!(groceries.total_debit, 500.0);
    assert_eq!(groceries.net, -500.0);

    let income = &summary[0];
    assert_eq!(income.category, "Income");
    assert_eq!(income.total_credit, 12000.0);
}

#[test]
fn test_categories_survive_ledger_csv() {
    let table = MasterKeywordTable::from_csv_reader(MASTER.as_bytes()).unwrap();
    let mut txns = ledger();
    categorize_transactions(&mut txns, &table);

    let mut out = Vec::new();
    write_transactions(&mut out, &txns).unwrap();
    let back = read_transactions(out.as_slice()).unwrap();

    assert_eq!(summarize(&back), summarize(&txns));
}

#[test]
fn test_ledger_csv_can_be_recategorized() {
    // The ledger's Description column is found like any statement export
    let mut out = Vec::new();
    write_transactions(&mut out, &ledger()).unwrap();

    let table = MasterKeywordTable::from_csv_reader(MASTER.as_bytes()).unwrap();
    let mut categorized = Vec::new();
    let report = categorize_csv(out.as_slice(), &mut categorized, &table).unwrap();
    assert_eq!(report.description_column, "Description");
    assert_eq!(report.rows, 5);
    assert_eq!(report.uncategorized, 1);

    let text = String::from_utf8(categorized).unwrap();
    assert!(text.lines().next().unwrap().ends_with(",Category,Categorization"));
    assert!(text.lines().nth(2).unwrap().ends_with(",Groceries"));
}

const RAK_TEXT: &str = "\
RAKBANK
Your Current Account Transactions
Date Description Amount Balance
05-Mar-2025 FUNDS TRANSFER FROM J DOE 1,000.00 6,250.00
06-Mar-2025 POS PURCHASE CARREFOUR 250.50 5,999.50
07-Mar-2025 ATM CASH 100.00 5,899.50
";

#[test]
fn test_categorize_extracted_statement() {
    let result = tally_ingest::extract_from_text("rak.pdf", RAK_TEXT, None, None);
    let mut txns = result.transactions;
    assert_eq!(txns.len(), 3);

    let table = MasterKeywordTable::from_rows([
        ("carrefour", "Groceries"),
        ("atm", "Cash"),
        ("transfer from", "Transfers"),
    ]);
    categorize_transactions(&mut txns, &table);

    let categories: Vec<&str> = txns.iter().map(|t| t.category.as_deref().unwrap()).collect();
    assert_eq!(categories, vec!["Transfers", "Groceries", "Cash"]);

    let summary = summarize(&txns);
    assert_eq!(summary[0].total_credit, 1000.0);
    assert_eq!(summary[1].total_debit, 250.5);
    assert_eq!(summary[2].net, -100.0);
}
