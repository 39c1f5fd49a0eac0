//! Utilities for parsing and formatting Excel-style cell references and ranges.
//!
//! All indices are 0-based: `A1` is `(col 0, row 0)`.

/// Largest column Excel accepts (`XFD`), 0-indexed
pub const MAX_COL: u32 = 16_383;

/// Largest row Excel accepts, 0-indexed
pub const MAX_ROW: u32 = 1_048_575;

/// Parse a cell reference like "A1" or "$B$10" into (col, row), 0-indexed.
///
/// Letters must come before digits; anything else is rejected.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Parse a cell reference from raw bytes (ASCII) into (col, row), 0-indexed.
///
/// This is the bytes equivalent of [`parse_cell_ref`] for use when working with
/// raw XML attribute values (e.g., `attr.value` from quick-xml).
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut col_len = 0;
    let mut row_len = 0;

    let mut bytes = ref_bytes.iter().copied().peekable();
    if bytes.peek() == Some(&b'$') {
        bytes.next();
    }
    while let Some(&b) = bytes.peek() {
        if !b.is_ascii_alphabetic() {
            break;
        }
        col_len += 1;
        if col_len > 3 {
            return None;
        }
        let upper = b.to_ascii_uppercase();
        col = col * 26 + (u32::from(upper - b'A') + 1);
        bytes.next();
    }
    if bytes.peek() == Some(&b'$') {
        bytes.next();
    }
    for b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
        row_len += 1;
    }

    if col_len == 0 || row_len == 0 || row == 0 {
        return None;
    }
    let (col, row) = (col - 1, row - 1);
    if col > MAX_COL || row > MAX_ROW {
        return None;
    }
    Some((col, row))
}

/// Parse a cell range like "A1:B10" or "A1" into (start_row, start_col, end_row, end_col).
///
/// The corners are normalized so that start <= end on both axes.
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    if let Some((start, end)) = range.split_once(':') {
        let (col1, row1) = parse_cell_ref(start)?;
        let (col2, row2) = parse_cell_ref(end)?;
        Some((row1.min(row2), col1.min(col2), row1.max(row2), col1.max(col2)))
    } else {
        let (start_col, start_row) = parse_cell_ref(range)?;
        Some((start_row, start_col, start_row, start_col))
    }
}

/// True for ranges that span whole columns (`A:C`) or whole rows (`1:3`).
pub fn is_whole_row_or_column(range: &str) -> bool {
    let Some((start, end)) = range.split_once(':') else {
        return false;
    };
    let only = |s: &str, f: fn(&u8) -> bool| {
        let s = s.trim_start_matches('$');
        !s.is_empty() && s.bytes().filter(|b| *b != b'$').all(|b| f(&b))
    };
    (only(start, u8::is_ascii_alphabetic) && only(end, u8::is_ascii_alphabetic))
        || (only(start, u8::is_ascii_digit) && only(end, u8::is_ascii_digit))
}

/// Column letters for a 0-indexed column (0 → "A", 27 → "AB").
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style name for a 0-indexed (row, col)
pub fn cell_name(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row + 1)
}
