//! Statement extraction pipeline.
//!
//! bytes -> text layer -> raw lines -> (detect bank) -> normalized lines ->
//! blocks -> rows -> bank cleanup -> reconciliation. Every problem on the way
//! becomes a [`Diagnostic`] on the file's result; nothing here aborts a batch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tally_core::{BatchResult, Diagnostic, DiagnosticKind, StatementResult, reconcile};
use tracing::{debug, info, warn};

use crate::extract::BlockError;
use crate::normalize::{NoiseFilter, normalize_lines};
use crate::pdf::{TextBackend, extract_pages, raw_lines, raw_lines_from_text};
use crate::registry::{Bank, detect_bank, parser_for};
use crate::types::RawLine;

static FILE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid file number regex"));

/// One statement file to process
#[derive(Debug, Clone)]
pub struct StatementInput {
    pub source_file: String,
    pub bytes: Vec<u8>,
    /// Set when the file itself could not be read; extraction reports it
    /// in the file's place in the batch
    pub read_error: Option<String>,
}

impl StatementInput {
    pub fn new(source_file: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_file: source_file.into(),
            bytes,
            read_error: None,
        }
    }

    /// Read a file; the source name is the file name without directories
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self::new(source_name(path), bytes))
    }

    /// Like [`StatementInput::from_path`], but a read failure is kept on the
    /// input and surfaces as a `PdfUnreadable` diagnostic when extracted
    pub fn read(path: &Path) -> Self {
        Self::from_path(path).unwrap_or_else(|e| {
            warn!(file = %path.display(), error = %e, "file not readable");
            Self {
                source_file: source_name(path),
                bytes: Vec::new(),
                read_error: Some(format!("{e:#}")),
            }
        })
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Parser to use; detected from the text when unset
    pub bank: Option<Bank>,
    /// Balance before the first row, for balance-only banks
    pub opening_balance: Option<f64>,
    /// Order files by the first number in their names and seed each file's
    /// opening balance with the previous file's closing balance
    pub chain_balances: bool,
    pub text_backend: TextBackend,
}

/// Extract one statement PDF
pub fn extract_statement(input: &StatementInput, options: &ExtractOptions) -> StatementResult {
    match text_lines(input, options.text_backend) {
        Ok(raw) => parse_raw_lines(&input.source_file, &raw, options.bank, options.opening_balance),
        Err(unreadable) => unreadable,
    }
}

/// Raw lines of the file's text layer, or the result reporting why there is none
fn text_lines(input: &StatementInput, backend: TextBackend) -> Result<Vec<RawLine>, StatementResult> {
    let detail = match &input.read_error {
        Some(e) => e.clone(),
        None => match extract_pages(&input.bytes, backend) {
            Ok(pages) => return Ok(raw_lines(&input.source_file, &pages)),
            Err(e) => {
                warn!(file = %input.source_file, error = %e, "no usable text layer");
                e.to_string()
            }
        },
    };

    let mut result = StatementResult::new(&input.source_file);
    result.push_diagnostic(Diagnostic::new(DiagnosticKind::PdfUnreadable, detail).for_file(&input.source_file));
    Err(result)
}

fn resolve_bank(raw: &[RawLine], bank: Option<Bank>) -> Option<Bank> {
    bank.or_else(|| detect_bank(&normalize_lines(raw, &NoiseFilter::new())))
}

/// Run the parsing stages over a text layer extracted elsewhere.
///
/// Form feeds in `text` separate pages.
pub fn extract_from_text(
    source_file: &str,
    text: &str,
    bank: Option<Bank>,
    opening_balance: Option<f64>,
) -> StatementResult {
    let raw = raw_lines_from_text(source_file, text);
    parse_raw_lines(source_file, &raw, bank, opening_balance)
}

fn parse_raw_lines(source_file: &str, raw: &[RawLine], bank: Option<Bank>, opening: Option<f64>) -> StatementResult {
    let mut result = StatementResult::new(source_file);

    let Some(bank) = resolve_bank(raw, bank) else {
        warn!(file = %source_file, "could not tell which bank issued this statement");
        result.push_diagnostic(
            Diagnostic::new(DiagnosticKind::UnknownBank, "no bank signature found; pass a bank explicitly")
                .for_file(source_file),
        );
        return result;
    };
    debug!(file = %source_file, bank = %bank, "parsing");
    result.bank = Some(bank.id().to_string());

    let parser = parser_for(bank);
    let lines = normalize_lines(raw, parser.noise());
    let blocks = parser.segment(&lines);
    if blocks.is_empty() {
        warn!(file = %source_file, bank = %bank, "no transaction rows found");
        result.push_diagnostic(
            Diagnostic::new(
                DiagnosticKind::BlockParseFailure,
                format!("no transaction rows recognised as {}", bank.name()),
            )
            .for_file(source_file),
        );
        return result;
    }

    let mut transactions = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let page = block.first().map(|l| l.page_index + 1).unwrap_or(0);
        match parser.extract(block, source_file) {
            Ok(extracted) => {
                for issue in &extracted.issues {
                    result.push_diagnostic(
                        Diagnostic::new(
                            DiagnosticKind::MalformedNumericField,
                            format!("block {} (page {page}): {} {:?} left empty", i + 1, issue.field, issue.raw),
                        )
                        .for_file(source_file),
                    );
                }
                transactions.push(extracted.transaction);
            }
            Err(BlockError::NotATransaction { reason }) => {
                debug!(file = %source_file, block = i + 1, %reason, "skipped row");
            }
            Err(e) => {
                result.push_diagnostic(
                    Diagnostic::new(DiagnosticKind::BlockParseFailure, format!("block {} (page {page}): {e}", i + 1))
                        .for_file(source_file),
                );
            }
        }
    }

    let mut transactions = parser.finish(transactions);

    if parser.needs_reconciliation() {
        if let Err(e) = reconcile(&mut transactions, opening) {
            warn!(file = %source_file, error = %e, "amounts not derived");
            result.push_diagnostic(
                Diagnostic::new(DiagnosticKind::ReconciliationSkipped, e.to_string()).for_file(source_file),
            );
        }
    }

    info!(
        file = %source_file,
        bank = %bank,
        rows = transactions.len(),
        problems = result.diagnostics.len(),
        "statement extracted"
    );
    result.transactions = transactions;
    result
}

fn file_number(name: &str) -> u64 {
    FILE_NUMBER_RE
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(u64::MAX)
}

/// Closing balances carried from file to file, per bank
#[derive(Debug, Default)]
struct BalanceChain {
    closing: HashMap<Bank, f64>,
    first_bank: Option<Bank>,
}

impl BalanceChain {
    /// Opening balance for the next file of `bank`.
    ///
    /// The caller's opening balance only seeds the first bank in the chain;
    /// a bank seen for the first time later starts without one.
    fn opening_for(&mut self, bank: Bank, caller: Option<f64>) -> Option<f64> {
        let first = *self.first_bank.get_or_insert(bank);
        match self.closing.get(&bank) {
            Some(closing) => Some(*closing),
            None if first == bank => caller,
            None => None,
        }
    }

    fn parse(&mut self, source_file: &str, raw: &[RawLine], options: &ExtractOptions) -> StatementResult {
        let Some(bank) = resolve_bank(raw, options.bank) else {
            return parse_raw_lines(source_file, raw, None, None);
        };

        let opening = self.opening_for(bank, options.opening_balance);
        debug!(file = %source_file, bank = %bank, ?opening, "chained opening balance");
        let result = parse_raw_lines(source_file, raw, Some(bank), opening);
        if let Some(closing) = result.closing_balance() {
            self.closing.insert(bank, closing);
        }
        result
    }
}

/// Extract a batch of statements.
///
/// Results keep input order, except with `chain_balances`, where files are
/// processed and returned in filename-number order so each closing balance
/// can seed the next opening balance of the same bank. Without chaining the
/// opening balance applies to every file.
pub fn extract_batch(inputs: &[StatementInput], options: &ExtractOptions) -> BatchResult {
    let mut ordered: Vec<&StatementInput> = inputs.iter().collect();
    if options.chain_balances {
        ordered.sort_by_key(|input| file_number(&input.source_file));
    }

    let mut batch = BatchResult::default();
    let mut chain = BalanceChain::default();

    for input in ordered {
        let result = match text_lines(input, options.text_backend) {
            Ok(raw) if options.chain_balances => chain.parse(&input.source_file, &raw, options),
            Ok(raw) => parse_raw_lines(&input.source_file, &raw, options.bank, options.opening_balance),
            Err(unreadable) => unreadable,
        };
        batch.statements.push(result);
    }

    let failed = batch.failed_files().len();
    info!(
        files = batch.statements.len(),
        failed,
        rows = batch.transaction_count(),
        "batch extracted"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_number_ordering() {
        assert_eq!(file_number("Statement2.pdf"), 2);
        assert_eq!(file_number("fab_10_march.pdf"), 10);
        assert_eq!(file_number("statement.pdf"), u64::MAX);
    }

    #[test]
    fn test_unknown_bank_is_reported() {
        let result = extract_from_text("x.pdf", "hello\nworld", None, None);
        assert!(result.transactions.is_empty());
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnknownBank);
        assert_eq!(result.diagnostics[0].source_file.as_deref(), Some("x.pdf"));
    }

    #[test]
    fn test_out_of_order_rows_skip_reconciliation() {
        let text = "2025-01-05 B 900.00\n2025-01-03 A 1,000.00\n";
        let result = extract_from_text("m.pdf", text, Some(Bank::Mashreq), Some(1000.0));
        assert_eq!(result.transactions.len(), 2);
        assert!(result.transactions.iter().all(|t| t.amount.is_none()));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::ReconciliationSkipped)
        );
    }

    const RAK: &str = "RAKBANK\nDate Description Amount Balance\n05-Mar-2025 ATM CASH 100.00 5,899.50\n";

    fn mashreq(first: &str, second: &str) -> String {
        format!("Mashreq Bank\n2025-01-03 POS ENOC 4411 {first}\n2025-01-05 SALARY ACME {second}\n")
    }

    fn chained(chain: &mut BalanceChain, name: &str, text: &str, options: &ExtractOptions) -> StatementResult {
        chain.parse(name, &raw_lines_from_text(name, text), options)
    }

    #[test]
    fn test_balance_not_carried_across_banks() {
        let options = ExtractOptions {
            chain_balances: true,
            ..Default::default()
        };
        let mut chain = BalanceChain::default();

        let rak = chained(&mut chain, "1.pdf", RAK, &options);
        assert_eq!(rak.bank.as_deref(), Some("rak"));
        assert_eq!(rak.closing_balance(), Some(5899.5));

        let m = chained(&mut chain, "2.pdf", &mashreq("950.00", "2,950.00"), &options);
        assert_eq!(m.bank.as_deref(), Some("mashreq"));
        assert_eq!(m.transactions[0].amount, None);
        assert_eq!(m.transactions[1].amount, Some(2000.0));
    }

    #[test]
    fn test_balance_carried_past_other_bank() {
        let options = ExtractOptions {
            chain_balances: true,
            opening_balance: Some(1000.0),
            ..Default::default()
        };
        let mut chain = BalanceChain::default();

        let first = chained(&mut chain, "1.pdf", &mashreq("950.00", "2,950.00"), &options);
        assert_eq!(first.transactions[0].amount, Some(-50.0));

        // a different bank in between neither takes nor clears the carry
        let rak = chained(&mut chain, "2.pdf", RAK, &options);
        assert_eq!(rak.transactions.len(), 1);

        let second = chained(&mut chain, "3.pdf", &mashreq("2,900.00", "2,800.00"), &options);
        assert_eq!(second.transactions[0].amount, Some(-50.0));
        assert_eq!(second.transactions[1].amount, Some(-100.0));
    }

    #[test]
    fn test_caller_opening_seeds_only_first_bank() {
        let options = ExtractOptions {
            chain_balances: true,
            opening_balance: Some(6000.0),
            ..Default::default()
        };
        let mut chain = BalanceChain::default();
        assert_eq!(chain.opening_for(Bank::Rak, options.opening_balance), Some(6000.0));
        assert_eq!(chain.opening_for(Bank::Mashreq, options.opening_balance), None);
        assert_eq!(chain.opening_for(Bank::Rak, options.opening_balance), Some(6000.0));
    }

    #[test]
    fn test_unreadable_bytes_become_diagnostic() {
        let input = StatementInput::new("broken.pdf", b"not a pdf".to_vec());
        let result = extract_statement(
            &input,
            &ExtractOptions {
                text_backend: TextBackend::PdfExtract,
                ..Default::default()
            },
        );
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::PdfUnreadable);
        assert!(result.transactions.is_empty());
    }
}
