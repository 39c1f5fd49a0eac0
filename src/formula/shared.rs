//! Shared formula expansion.
//!
//! SpreadsheetML writes a block of structurally identical formulas once, on
//! the master cell (`<f t="shared" ref="B1:B10" si="0">A1*2</f>`). Every other
//! cell of the block carries only `<f t="shared" si="0"/>` and inherits the
//! master's text with its relative references moved by the row/column
//! distance to the master. Absolute (`$`) parts stay put.

use std::collections::HashMap;

use super::tokenizer::{tokenize, TokenKind};
use crate::cell_ref::{column_letters, parse_cell_ref, MAX_COL, MAX_ROW};

#[derive(Debug, Clone)]
struct Master {
    row: u32,
    col: u32,
    text: String,
}

/// Shared formula groups of one worksheet, collected while reading it
#[derive(Debug, Default)]
pub struct SharedFormulas {
    masters: HashMap<u32, Master>,
    followers: Vec<(u32, u32, u32)>,
}

impl SharedFormulas {
    /// Record the cell defining group `si`; `text` includes the leading `=`.
    pub fn add_master(&mut self, si: u32, row: u32, col: u32, text: &str) {
        self.masters.insert(
            si,
            Master {
                row,
                col,
                text: text.to_string(),
            },
        );
    }

    pub fn add_follower(&mut self, si: u32, row: u32, col: u32) {
        self.followers.push((si, row, col));
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }

    /// Formula text for every follower whose group has a master.
    pub fn resolve(&self) -> Vec<(u32, u32, String)> {
        self.followers
            .iter()
            .filter_map(|&(si, row, col)| {
                let Some(master) = self.masters.get(&si) else {
                    tracing::debug!(si, row, col, "shared formula follower without master");
                    return None;
                };
                let d_row = i64::from(row) - i64::from(master.row);
                let d_col = i64::from(col) - i64::from(master.col);
                Some((row, col, shift_formula(&master.text, d_row, d_col)))
            })
            .collect()
    }
}

/// Move every relative reference in `formula` by (`d_row`, `d_col`).
///
/// A reference pushed off the sheet becomes `#REF!`. Text that does not
/// tokenize is returned unchanged.
pub fn shift_formula(formula: &str, d_row: i64, d_col: i64) -> String {
    let Ok(tokens) = tokenize(formula) else {
        return formula.to_string();
    };
    if tokens.first().is_some_and(|t| t.kind == TokenKind::Literal) {
        return formula.to_string();
    }

    let mut out = String::with_capacity(formula.len() + 4);
    out.push('=');
    for token in &tokens {
        if token.is_range() {
            let shifted = shift_reference(&token.value, d_row, d_col);
            out.push_str(shifted.as_deref().unwrap_or("#REF!"));
        } else {
            out.push_str(&token.value);
        }
    }
    out
}

/// `None` when the shift leaves the sheet
fn shift_reference(text: &str, d_row: i64, d_col: i64) -> Option<String> {
    let (prefix, reference) = match text.rfind('!') {
        Some(bang) => text.split_at(bang + 1),
        None => ("", text),
    };

    let mut out = String::from(prefix);
    if let Some((start, end)) = reference.split_once(':') {
        out.push_str(&shift_part(start, d_row, d_col, true)?);
        out.push(':');
        out.push_str(&shift_part(end, d_row, d_col, true)?);
    } else {
        out.push_str(&shift_part(reference, d_row, d_col, false)?);
    }
    Some(out)
}

/// Shift one side of a reference. Parts that are not coordinates (defined
/// names, structured references) come back unchanged. Column-only and
/// row-only parts are only accepted inside a range.
fn shift_part(part: &str, d_row: i64, d_col: i64, in_range: bool) -> Option<String> {
    let unchanged = Some(part.to_string());
    let bytes = part.as_bytes();

    let mut i = 0;
    let mut col_abs = bytes.first() == Some(&b'$');
    if col_abs {
        i += 1;
    }
    let letters_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
        i += 1;
    }
    let Some(letters) = part.get(letters_start..i) else {
        return unchanged;
    };
    let mut row_abs = bytes.get(i) == Some(&b'$');
    if row_abs {
        i += 1;
    }
    let Some(digits) = part.get(i..) else {
        return unchanged;
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) || letters.len() > 3 {
        return unchanged;
    }
    if letters.is_empty() {
        // `$3` marks an absolute row
        row_abs = row_abs || col_abs;
        col_abs = false;
    }
    let complete = !letters.is_empty() && !digits.is_empty();
    if !complete && !(in_range && (letters.is_empty() != digits.is_empty())) {
        return unchanged;
    }

    let mut out = String::new();
    if !letters.is_empty() {
        let (col, _) = parse_cell_ref(&format!("{letters}1"))?;
        let col = if col_abs {
            i64::from(col)
        } else {
            i64::from(col) + d_col
        };
        let col = u32::try_from(col).ok().filter(|c| *c <= MAX_COL)?;
        if col_abs {
            out.push('$');
        }
        out.push_str(&column_letters(col));
    }
    if !digits.is_empty() {
        let row: i64 = digits.parse().ok()?;
        let row = if row_abs { row } else { row + d_row };
        let row = u32::try_from(row)
            .ok()
            .filter(|r| (1..=MAX_ROW + 1).contains(r))?;
        if row_abs {
            out.push('$');
        }
        out.push_str(&row.to_string());
    }
    Some(out)
}
