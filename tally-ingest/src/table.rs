//! Column handling for table-layout statements.
//!
//! Column positions come from the header row. Text cells belong to the last
//! column starting at or before them. Figures are aligned left, right or
//! centred depending on the bank, so they go to the header nearest their
//! midpoint; an empty debit cell never shifts the credit figure over.

use tally_core::parse_amount;

use crate::types::{BlockContext, Cell, Line, TransactionBlock};

/// Role of one statement column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    ValueDate,
    Description,
    Reference,
    Debit,
    Credit,
    Balance,
}

/// Header spans (char columns) taken from a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<(Column, usize, usize)>,
}

impl ColumnLayout {
    /// Build a layout when every label appears as a header cell.
    ///
    /// Labels are compared case-insensitively against cells; a cell that
    /// contains a label also counts, for headers printed with a second
    /// language alongside.
    pub fn from_header(line: &Line, labels: &[(&str, Column)]) -> Option<Self> {
        let mut columns = Vec::with_capacity(labels.len());
        for (label, column) in labels {
            let label = label.to_lowercase();
            let cell = line
                .cells
                .iter()
                .find(|c| c.text.to_lowercase().contains(&label))?;
            columns.push((*column, cell.start, cell.end));
        }
        columns.sort_by_key(|(_, start, _)| *start);
        Some(Self { columns })
    }

    fn column_of(&self, cell: &Cell) -> Column {
        let found = if is_figure(&cell.text) {
            // doubled midpoints keep the arithmetic in integers
            let mid = cell.start + cell.end;
            self.columns
                .iter()
                .min_by_key(|(_, start, end)| (start + end).abs_diff(mid))
        } else {
            self.columns
                .iter()
                .rev()
                .find(|(_, start, _)| *start <= cell.start)
                .or_else(|| self.columns.first())
        };
        found.map(|(column, _, _)| *column).unwrap_or(Column::Description)
    }

    /// Text of one column in a row; cells sharing a column are joined
    pub fn get(&self, line: &Line, column: Column) -> String {
        line.cells
            .iter()
            .filter(|c| self.column_of(c) == column)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.iter().any(|(c, _, _)| *c == column)
    }
}

fn is_figure(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && matches!(parse_amount(text), Ok(Some(_)))
}

/// Rules for turning table lines into row blocks
pub struct TableRows<'a> {
    pub header: &'a [(&'a str, Column)],
    /// A line that starts a new row (normally: first cell is a date)
    pub is_row_start: &'a dyn Fn(&Line) -> bool,
    /// Lines that end the table region (totals, closing balance)
    pub is_terminator: &'a dyn Fn(&Line) -> bool,
}

/// Group table lines into one block per row.
///
/// Lines before the first header are skipped. Repeated page headers refresh
/// the layout and are dropped. A line that does not start a row is a wrapped
/// description and is folded into the open row. With no header at all, rows
/// are still collected and carry no layout.
pub fn table_rows(lines: &[Line], rules: &TableRows<'_>) -> Vec<TransactionBlock> {
    let mut blocks: Vec<TransactionBlock> = Vec::new();
    let mut layout: Option<ColumnLayout> = None;
    let mut open: Option<TransactionBlock> = None;
    let any_header = lines
        .iter()
        .any(|l| ColumnLayout::from_header(l, rules.header).is_some());

    for line in lines {
        if let Some(found) = ColumnLayout::from_header(line, rules.header) {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            layout = Some(found);
            continue;
        }
        if any_header && layout.is_none() {
            continue;
        }
        if (rules.is_terminator)(line) {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            continue;
        }
        if (rules.is_row_start)(line) {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            let context = BlockContext {
                columns: layout.clone(),
                ..BlockContext::default()
            };
            open = Some(TransactionBlock::new(vec![line.clone()]).with_context(context));
        } else if let Some(block) = open.as_mut() {
            block.lines.push(line.clone());
        }
    }

    if let Some(block) = open {
        blocks.push(block);
    }
    blocks
}

/// Description text of a row block: the description column of every line
pub fn row_description(block: &TransactionBlock, layout: &ColumnLayout) -> String {
    block
        .lines
        .iter()
        .map(|l| layout.get(l, Column::Description))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::split_cells;

    fn line(text: &str) -> Line {
        Line {
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            cells: split_cells(text),
            page_index: 0,
        }
    }

    const HEADER: &[(&str, Column)] = &[
        ("Date", Column::Date),
        ("Description", Column::Description),
        ("Debit", Column::Debit),
        ("Credit", Column::Credit),
        ("Balance", Column::Balance),
    ];

    #[test]
    fn test_layout_places_right_aligned_figures() {
        let header = line("Date          Description            Debit      Credit      Balance");
        let layout = ColumnLayout::from_header(&header, HEADER).unwrap();

        let row = line("01-02-2025    SALARY ACME                     5,000.00     6,000.00");
        assert_eq!(layout.get(&row, Column::Date), "01-02-2025");
        assert_eq!(layout.get(&row, Column::Description), "SALARY ACME");
        assert_eq!(layout.get(&row, Column::Debit), "");
        assert_eq!(layout.get(&row, Column::Credit), "5,000.00");
        assert_eq!(layout.get(&row, Column::Balance), "6,000.00");

        let row = line("02-02-2025    RENT                    1,500.00                 4,500.00");
        assert_eq!(layout.get(&row, Column::Debit), "1,500.00");
        assert_eq!(layout.get(&row, Column::Credit), "");
    }

    #[test]
    fn test_missing_label_is_not_a_header() {
        let header = line("Date          Description            Debit");
        assert!(ColumnLayout::from_header(&header, HEADER).is_none());
    }

    #[test]
    fn test_table_rows_fold_wrapped_lines_and_skip_repeated_headers() {
        let lines = vec![
            line("Statement of account"),
            line("Date          Description            Debit      Credit      Balance"),
            line("01-02-2025    POS PURCHASE             100.00               900.00"),
            line("              CARREFOUR MOE"),
            line("Date          Description            Debit      Credit      Balance"),
            line("03-02-2025    REFUND                               20.00    920.00"),
            line("Closing balance                                              920.00"),
            line("Thank you for banking with us"),
        ];
        let is_start = |l: &Line| l.cell(0).starts_with("0");
        let is_end = |l: &Line| l.text.to_lowercase().starts_with("closing balance");
        let rules = TableRows {
            header: HEADER,
            is_row_start: &is_start,
            is_terminator: &is_end,
        };
        let blocks = table_rows(&lines, &rules);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[1].lines.len(), 1);

        let layout = blocks[0].context.columns.as_ref().unwrap();
        assert_eq!(row_description(&blocks[0], layout), "POS PURCHASE CARREFOUR MOE");
    }
}
