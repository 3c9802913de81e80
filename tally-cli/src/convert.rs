use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use tally_core::{BatchResult, Diagnostic, Transaction};
use tally_finance::{
    CategorySummary, categorize_transactions, load_master_table, summarize, write_transactions,
    write_transactions_to_path,
};
use tally_ingest::{Bank, ExtractOptions, StatementInput, TextBackend, extract_batch};

use crate::config::{Config, ExtractSection};
use crate::state::DEFAULT_RUN_OUTPUT;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Statement PDFs
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Bank id (see `tally banks`); detected per file when omitted
    #[arg(long)]
    pub bank: Option<Bank>,

    /// Balance before the first row, for banks that print balances only
    #[arg(long, allow_hyphen_values = true)]
    pub opening_balance: Option<f64>,

    /// Order files by the number in their names and carry each closing
    /// balance into the next file
    #[arg(long)]
    pub chain: bool,

    /// Output CSV (default: stdout for convert)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Text layer backend: auto, pdf-extract, pdftotext
    #[arg(long)]
    pub backend: Option<TextBackend>,

    /// Print the diagnostics report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    fn options(&self, cfg: &ExtractSection) -> ExtractOptions {
        ExtractOptions {
            bank: self.bank,
            opening_balance: self.opening_balance,
            chain_balances: self.chain || cfg.chain_balances,
            text_backend: self.backend.unwrap_or(cfg.text_backend),
        }
    }
}

/// Read and extract every file; unreadable paths become diagnostics in
/// their place in the batch
fn extract(args: &ConvertArgs, cfg: &Config) -> BatchResult {
    let options = args.options(&cfg.extract);
    let inputs: Vec<StatementInput> = args.files.iter().map(|path| StatementInput::read(path)).collect();
    extract_batch(&inputs, &options)
}

pub fn convert(args: ConvertArgs, cfg: &Config) -> Result<ExitCode> {
    let batch = extract(&args, cfg);
    let transactions = batch.combined();

    match &args.out {
        Some(path) => write_ledger(path, &transactions)?,
        None => write_transactions(std::io::stdout().lock(), &transactions)?,
    }
    report(&batch, args.json)?;
    Ok(exit_code(&batch))
}

/// Extract, categorize, write the ledger and print per-category totals.
///
/// A keyword table that cannot be loaded is reported; the ledger is still
/// written, uncategorized.
pub async fn run(args: ConvertArgs, master: Option<String>, cfg: &Config) -> Result<ExitCode> {
    let mut batch = extract(&args, cfg);
    let mut transactions = batch.combined();

    let source = cfg.master.source(master.as_deref());
    let categorized = match load_master_table(&source, &cfg.master.fetch_policy()).await {
        Ok(table) => {
            categorize_transactions(&mut transactions, &table);
            true
        }
        Err(e) => {
            warn!(error = %e, "categorization abandoned");
            batch.diagnostics.extend(e.to_diagnostic());
            false
        }
    };

    let out = args.out.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_RUN_OUTPUT));
    write_ledger(&out, &transactions)?;

    if categorized {
        print_summary(&summarize(&transactions));
    }
    report(&batch, args.json)?;
    Ok(exit_code(&batch))
}

fn write_ledger(path: &Path, transactions: &[Transaction]) -> Result<()> {
    write_transactions_to_path(path, transactions)?;
    info!(path = %path.display(), rows = transactions.len(), "ledger written");
    Ok(())
}

/// True when no file produced a single row
fn all_failed(batch: &BatchResult) -> bool {
    !batch.statements.is_empty() && batch.failed_files().len() == batch.statements.len()
}

fn exit_code(batch: &BatchResult) -> ExitCode {
    if all_failed(batch) { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    source_file: &'a str,
    bank: Option<&'a str>,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    files: Vec<FileReport<'a>>,
    rows: usize,
    diagnostics: Vec<&'a Diagnostic>,
}

impl<'a> Report<'a> {
    fn new(batch: &'a BatchResult) -> Self {
        Self {
            files: batch
                .statements
                .iter()
                .map(|s| FileReport {
                    source_file: &s.source_file,
                    bank: s.bank.as_deref(),
                    rows: s.transactions.len(),
                })
                .collect(),
            rows: batch.transaction_count(),
            diagnostics: batch.all_diagnostics(),
        }
    }
}

/// Per-file counts and diagnostics on stderr; stdout may carry the CSV
fn report(batch: &BatchResult, json: bool) -> Result<()> {
    let report = Report::new(batch);
    if json {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for f in &report.files {
        eprintln!("{}: {} rows ({})", f.source_file, f.rows, f.bank.unwrap_or("no bank"));
    }
    if !report.diagnostics.is_empty() {
        eprintln!("\n{} diagnostic(s):", report.diagnostics.len());
        for d in &report.diagnostics {
            eprintln!("  {d}");
        }
    }
    Ok(())
}

fn print_summary(summary: &[CategorySummary]) {
    println!("{:<28} {:>6} {:>14} {:>14} {:>14}", "Category", "Count", "Debit", "Credit", "Net");
    for s in summary {
        println!(
            "{:<28} {:>6} {:>14.2} {:>14.2} {:>14.2}",
            s.category, s.count, s.total_debit, s.total_credit, s.net
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{DiagnosticKind, StatementResult};

    fn statement(name: &str, rows: usize) -> StatementResult {
        let mut s = StatementResult::new(name);
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        for _ in 0..rows {
            s.transactions.push(Transaction::new(date, "x", name));
        }
        s
    }

    #[test]
    fn test_exit_code_fails_only_when_every_file_failed() {
        let mut batch = BatchResult::default();
        assert!(!all_failed(&batch));

        batch.statements.push(statement("a.pdf", 0));
        assert!(all_failed(&batch));

        batch.statements.push(statement("b.pdf", 3));
        assert!(!all_failed(&batch));
    }

    #[test]
    fn test_flags_override_config() {
        let args = ConvertArgs {
            files: vec![PathBuf::from("a.pdf")],
            bank: Some(Bank::Fab),
            opening_balance: Some(-12.5),
            chain: false,
            out: None,
            backend: None,
            json: false,
        };
        let cfg = ExtractSection {
            text_backend: TextBackend::Pdftotext,
            chain_balances: true,
        };
        let options = args.options(&cfg);
        assert_eq!(options.bank, Some(Bank::Fab));
        assert_eq!(options.opening_balance, Some(-12.5));
        assert!(options.chain_balances);
        assert_eq!(options.text_backend, TextBackend::Pdftotext);
    }

    #[test]
    fn test_unreadable_files_keep_input_position() {
        let dir = std::env::temp_dir().join(format!("tally-cli-order-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let garbage = dir.join("b.pdf");
        std::fs::write(&garbage, b"not a pdf").unwrap();

        let args = ConvertArgs {
            files: vec![dir.join("a.pdf"), garbage, dir.join("c.pdf")],
            bank: None,
            opening_balance: None,
            chain: false,
            out: None,
            backend: Some(TextBackend::PdfExtract),
            json: false,
        };
        let batch = extract(&args, &Config::default());

        let names: Vec<&str> = batch.statements.iter().map(|s| s.source_file.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert!(
            batch
                .statements
                .iter()
                .all(|s| s.diagnostics[0].kind == DiagnosticKind::PdfUnreadable)
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_reported_not_fatal() {
        let args = ConvertArgs {
            files: vec![PathBuf::from("/nonexistent/tally/statement.pdf")],
            bank: None,
            opening_balance: None,
            chain: false,
            out: None,
            backend: Some(TextBackend::PdfExtract),
            json: false,
        };
        let batch = extract(&args, &Config::default());
        assert_eq!(batch.statements.len(), 1);
        assert_eq!(batch.all_diagnostics()[0].kind, DiagnosticKind::PdfUnreadable);
        assert!(all_failed(&batch));
    }
}
