//! Cell references used by a formula.
//!
//! Ranges are expanded row-major (`A1:B2` → A1, B1, A2, B2). Duplicates are
//! kept: `=A1+A1` uses A1 twice and the dependency metrics count it twice.
//! Anything that cannot become an edge inside the current sheet is reported
//! back as a [`SkippedReference`] instead.

use super::tokenizer::Token;
use crate::cell_ref::{is_whole_row_or_column, parse_cell_range, parse_cell_ref};
use crate::error::UnsupportedReason;

/// A reference operand that produced no (or not all of its) coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReference {
    pub reference: String,
    pub reason: UnsupportedReason,
}

/// Result of scanning one formula
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct References {
    /// 0-indexed (row, col), in formula order
    pub cells: Vec<(u32, u32)>,
    pub skipped: Vec<SkippedReference>,
}

impl References {
    fn skip(&mut self, reference: &str, reason: UnsupportedReason) {
        self.skipped.push(SkippedReference {
            reference: reference.to_string(),
            reason,
        });
    }
}

/// Collect the coordinates referenced by `tokens` that fall inside a
/// `max_row` x `max_col` grid.
pub fn extract_references(tokens: &[Token], max_row: u32, max_col: u32) -> References {
    let mut refs = References::default();

    for token in tokens.iter().filter(|t| t.is_range()) {
        let text = token.value.as_str();

        if text.contains('!') {
            refs.skip(text, UnsupportedReason::CrossSheet);
        } else if text.contains(':') {
            expand_range(text, max_row, max_col, &mut refs);
        } else if text.bytes().any(|b| b.is_ascii_digit()) {
            let stripped: String = text.chars().filter(char::is_ascii_alphanumeric).collect();
            match parse_cell_ref(&stripped) {
                Some((col, row)) if row < max_row && col < max_col => refs.cells.push((row, col)),
                Some(_) => refs.skip(text, UnsupportedReason::OutsideSheet),
                None => refs.skip(text, UnsupportedReason::Unparsable),
            }
        }
        // No digits: a defined name, nothing to follow
    }

    refs
}

fn expand_range(text: &str, max_row: u32, max_col: u32, refs: &mut References) {
    if is_whole_row_or_column(text) {
        refs.skip(text, UnsupportedReason::WholeRowOrColumn);
        return;
    }
    let Some((start_row, start_col, end_row, end_col)) = parse_cell_range(text) else {
        refs.skip(text, UnsupportedReason::Unparsable);
        return;
    };

    // Only the part of the rectangle inside the grid is expanded
    if start_row >= max_row || start_col >= max_col {
        refs.skip(text, UnsupportedReason::OutsideSheet);
        return;
    }
    let last_row = end_row.min(max_row - 1);
    let last_col = end_col.min(max_col - 1);
    for row in start_row..=last_row {
        for col in start_col..=last_col {
            refs.cells.push((row, col));
        }
    }
    if last_row < end_row || last_col < end_col {
        refs.skip(text, UnsupportedReason::OutsideSheet);
    }
}
