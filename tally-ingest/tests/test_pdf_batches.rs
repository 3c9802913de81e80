use tally_core::DiagnosticKind;
use tally_ingest::{ExtractOptions, StatementInput, TextBackend, extract_batch, extract_statement};

/// A one-page PDF drawing each line in Helvetica, top to bottom
fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 10 Tf\n50 780 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("0 -14 Td\n");
        }
        let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        content.push_str(&format!("({escaped}) Tj\n"));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 842] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}endstream", content.len()),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

fn fab_february() -> Vec<u8> {
    text_pdf(&[
        "First Abu Dhabi Bank PJSC",
        "DATE VALUE DATE DESCRIPTION DEBIT CREDIT BALANCE",
        "01 Feb 2025 01 Feb 2025 POS ALDI DUBAI 12.00 988.00",
        "02 Feb 2025 02 Feb 2025 SALARY ACME LLC 5,000.00 5,988.00",
        "03 Feb 2025 03 Feb 2025 ATM WITHDRAWAL 500.00 5,488.00",
    ])
}

fn fab_march() -> Vec<u8> {
    text_pdf(&[
        "First Abu Dhabi Bank PJSC",
        "DATE VALUE DATE DESCRIPTION DEBIT CREDIT BALANCE",
        "01 Mar 2025 01 Mar 2025 POS ENOC 100.00 5,388.00",
        "02 Mar 2025 02 Mar 2025 TRANSFER IN 200.00 5,588.00",
    ])
}

fn rak_march() -> Vec<u8> {
    text_pdf(&[
        "RAKBANK",
        "Your Current Account Transactions",
        "Date Description Amount Balance",
        "05-Mar-2025 FUNDS TRANSFER FROM J DOE 1,000.00 6,250.00",
        "07-Mar-2025 ATM CASH 100.00 6,150.00",
    ])
}

fn options(chain_balances: bool, opening_balance: Option<f64>) -> ExtractOptions {
    ExtractOptions {
        bank: None,
        opening_balance,
        chain_balances,
        text_backend: TextBackend::PdfExtract,
    }
}

#[test]
fn test_generated_pdf_is_extracted() {
    let input = StatementInput::new("fab_1.pdf", fab_february());
    let result = extract_statement(&input, &options(false, Some(1000.0)));

    assert_eq!(result.bank.as_deref(), Some("fab"));
    let amounts: Vec<Option<f64>> = result.transactions.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![Some(-12.0), Some(5000.0), Some(-500.0)]);
}

#[test]
fn test_mixed_batch_keeps_readable_rows() {
    let inputs = vec![
        StatementInput::new("rak.pdf", rak_march()),
        StatementInput::new("scan.pdf", b"%PDF-1.4 truncated".to_vec()),
    ];
    let batch = extract_batch(&inputs, &options(false, None));

    assert_eq!(batch.statements.len(), 2);
    let rak = &batch.statements[0];
    assert_eq!(rak.bank.as_deref(), Some("rak"));
    assert_eq!(rak.transactions.len(), 2);
    assert!(rak.diagnostics.is_empty(), "{:?}", rak.diagnostics);

    let scan = &batch.statements[1];
    assert!(scan.transactions.is_empty());
    assert_eq!(scan.diagnostics[0].kind, DiagnosticKind::PdfUnreadable);

    assert_eq!(batch.failed_files(), vec!["scan.pdf"]);
    assert_eq!(batch.combined().len(), 2);
}

#[test]
fn test_chained_balance_carries_within_bank() {
    let inputs = vec![
        StatementInput::new("fab_2.pdf", fab_march()),
        StatementInput::new("fab_1.pdf", fab_february()),
    ];
    let batch = extract_batch(&inputs, &options(true, Some(1000.0)));

    assert_eq!(batch.statements[0].source_file, "fab_1.pdf");
    let march = &batch.statements[1];
    assert_eq!(march.transactions[0].amount, Some(-100.0));
    assert_eq!(march.transactions[1].amount, Some(200.0));
}

#[test]
fn test_chained_balance_not_carried_across_banks() {
    let inputs = vec![
        StatementInput::new("statement_1.pdf", rak_march()),
        StatementInput::new("statement_2.pdf", fab_february()),
    ];
    let batch = extract_batch(&inputs, &options(true, None));

    assert_eq!(batch.statements[0].bank.as_deref(), Some("rak"));
    let fab = &batch.statements[1];
    assert_eq!(fab.bank.as_deref(), Some("fab"));
    // RAK's 6,150.00 closing balance is not FAB's opening balance
    assert_eq!(fab.transactions[0].amount, None);
    assert_eq!(fab.transactions[1].amount, Some(5000.0));
}
