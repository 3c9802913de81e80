//! Text-layer extraction from statement PDFs.
//!
//! Two backends: `pdf-extract` in process, and poppler's `pdftotext -layout`
//! when it is installed. The latter keeps column gaps, which table-layout
//! banks depend on.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::RawLine;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextBackend {
    /// `pdftotext` if found on PATH, else `pdf-extract`
    #[default]
    Auto,
    PdfExtract,
    Pdftotext,
}

impl FromStr for TextBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(TextBackend::Auto),
            "pdf-extract" | "pdf_extract" => Ok(TextBackend::PdfExtract),
            "pdftotext" => Ok(TextBackend::Pdftotext),
            other => Err(format!("unknown text backend: {other} (auto, pdf-extract, pdftotext)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf has no extractable text layer")]
    NoText,
    #[error("pdf could not be read: {0}")]
    Unreadable(String),
    #[error("pdftotext failed: {0}")]
    Pdftotext(String),
}

/// Extract per-page text from PDF bytes
pub fn extract_pages(bytes: &[u8], backend: TextBackend) -> Result<Vec<String>, PdfError> {
    let text = match backend {
        TextBackend::PdfExtract => extract_with_pdf_extract(bytes)?,
        TextBackend::Pdftotext => extract_with_pdftotext(bytes)?,
        TextBackend::Auto => {
            if which::which("pdftotext").is_ok() {
                extract_with_pdftotext(bytes)?
            } else {
                extract_with_pdf_extract(bytes)?
            }
        }
    };

    let pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(PdfError::NoText);
    }
    Ok(pages)
}

fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String, PdfError> {
    // pdf-extract panics on some malformed files instead of returning an error.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(PdfError::Unreadable(e.to_string())),
        Err(_) => Err(PdfError::Unreadable("parser panicked".to_string())),
    }
}

fn extract_with_pdftotext(bytes: &[u8]) -> Result<String, PdfError> {
    let bin = which::which("pdftotext").map_err(|_| PdfError::Pdftotext("pdftotext not found on PATH".to_string()))?;

    let path = temp_pdf_path();
    fs::write(&path, bytes).map_err(|e| PdfError::Pdftotext(format!("write {}: {e}", path.display())))?;

    let output = Command::new(bin)
        .args(["-layout", "-enc", "UTF-8"])
        .arg(&path)
        .arg("-")
        .output();
    let _ = fs::remove_file(&path);

    let output = output.map_err(|e| PdfError::Pdftotext(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PdfError::Unreadable(stderr));
    }

    debug!(bytes = output.stdout.len(), "pdftotext output");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn temp_pdf_path() -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("tally-{}-{n}.pdf", std::process::id()))
}

/// Split page texts into raw lines tagged with page index and file
pub fn raw_lines(source_file: &str, pages: &[String]) -> Vec<RawLine> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(page_index, page)| {
            page.lines()
                .map(move |line| RawLine::new(line, page_index, source_file))
        })
        .collect()
}

/// Raw lines from text that was extracted elsewhere (form feeds separate pages)
pub fn raw_lines_from_text(source_file: &str, text: &str) -> Vec<RawLine> {
    let pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
    raw_lines(source_file, &pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("auto".parse::<TextBackend>().unwrap(), TextBackend::Auto);
        assert_eq!("PDFTOTEXT".parse::<TextBackend>().unwrap(), TextBackend::Pdftotext);
        assert_eq!("pdf_extract".parse::<TextBackend>().unwrap(), TextBackend::PdfExtract);
        assert!("ocr".parse::<TextBackend>().is_err());
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = extract_pages(b"definitely not a pdf", TextBackend::PdfExtract).unwrap_err();
        assert!(matches!(err, PdfError::Unreadable(_)));
    }

    #[test]
    fn test_raw_lines_track_pages() {
        let lines = raw_lines_from_text("s.pdf", "a\nb\x0cc");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].page_index, 0);
        assert_eq!(lines[2].page_index, 1);
        assert_eq!(lines[2].text, "c");
        assert_eq!(lines[2].source_file, "s.pdf");
    }
}
