use serde::{Deserialize, Serialize};

use crate::table::ColumnLayout;

/// One line of a statement's text layer, as extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,
    pub page_index: usize,
    pub source_file: String,
}

impl RawLine {
    pub fn new(text: impl Into<String>, page_index: usize, source_file: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_index,
            source_file: source_file.into(),
        }
    }
}

/// A run of text between column gaps, with its character column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    /// Char offset of the first character in the layout line
    pub start: usize,
    /// Char offset one past the last character
    pub end: usize,
}

/// A cleaned line.
///
/// `text` has its whitespace collapsed; `cells` keeps the column split
/// (runs of two or more spaces, or tabs) for table-layout statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub cells: Vec<Cell>,
    pub page_index: usize,
}

impl Line {
    pub fn cell(&self, i: usize) -> &str {
        self.cells.get(i).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn cell_texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Statement context a block was found in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockContext {
    pub account: Option<String>,
    pub currency: Option<String>,
    /// Column positions from the nearest table header above the block
    pub columns: Option<ColumnLayout>,
}

/// Contiguous lines judged to belong to one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBlock {
    pub lines: Vec<Line>,
    pub context: BlockContext,
}

impl TransactionBlock {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            context: BlockContext::default(),
        }
    }

    pub fn with_context(mut self, context: BlockContext) -> Self {
        self.context = context;
        self
    }

    pub fn first(&self) -> Option<&Line> {
        self.lines.first()
    }

    /// All line texts joined with single spaces
    pub fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
