//! Transaction segmentation.
//!
//! A two-state machine: `SeekingStart` discards lines until the bank's start
//! signature is seen; `InTransaction` appends lines to the open block until
//! the next start signature flushes it. End of input flushes the open block.

use regex::Regex;

use crate::types::{Line, TransactionBlock};

/// What marks the first line of a transaction
#[derive(Debug, Clone)]
pub enum StartSignature {
    /// The line matches the pattern (one date, or two dates on one line)
    Line(Regex),
    /// This line and the next one each match (transaction date and value
    /// date printed on separate lines)
    AdjacentLines(Regex),
    /// The first alternative that matches; for banks whose rows look
    /// different under different text backends
    AnyOf(Vec<StartSignature>),
}

impl StartSignature {
    /// Number of lines the start occupies at `i`, if a start is there
    fn match_width(&self, lines: &[Line], i: usize) -> Option<usize> {
        match self {
            StartSignature::Line(re) => re.is_match(&lines[i].text).then_some(1),
            StartSignature::AdjacentLines(re) => {
                (i + 1 < lines.len() && re.is_match(&lines[i].text) && re.is_match(&lines[i + 1].text)).then_some(2)
            }
            StartSignature::AnyOf(options) => options.iter().find_map(|o| o.match_width(lines, i)),
        }
    }
}

enum SegmentState {
    SeekingStart,
    InTransaction(Vec<Line>),
}

/// Group normalized lines into transaction blocks
pub fn segment(lines: &[Line], signature: &StartSignature) -> Vec<TransactionBlock> {
    let mut blocks = Vec::new();
    let mut state = SegmentState::SeekingStart;
    let mut i = 0;

    while i < lines.len() {
        if let Some(width) = signature.match_width(lines, i) {
            if let SegmentState::InTransaction(open) = state {
                blocks.push(TransactionBlock::new(open));
            }
            state = SegmentState::InTransaction(lines[i..i + width].to_vec());
            i += width;
            continue;
        }

        if let SegmentState::InTransaction(open) = &mut state {
            open.push(lines[i].clone());
        }
        i += 1;
    }

    if let SegmentState::InTransaction(open) = state {
        blocks.push(TransactionBlock::new(open));
    }

    blocks
}
