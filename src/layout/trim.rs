//! Shrink a sheet to the region that actually holds content.
//!
//! Spreadsheet files routinely report a used range far larger than the data
//! (formatting applied to whole columns, rows touched and cleared). The map
//! only covers rows and columns up to the last non-blank cell.

use crate::types::Sheet;

/// Last row and column (0-indexed) holding a non-blank cell
fn content_bounds(sheet: &Sheet) -> Option<(u32, u32)> {
    sheet
        .cells
        .iter()
        .filter(|data| !data.cell.is_blank())
        .fold(None, |acc, data| match acc {
            None => Some((data.r, data.c)),
            Some((r, c)) => Some((r.max(data.r), c.max(data.c))),
        })
}

/// Trim `sheet` in place to its content region.
///
/// Cells, row heights and column widths past the last non-blank row/column
/// are dropped; merges are clipped, or dropped when their anchor falls
/// outside. A sheet without content keeps a single A1 cell region.
/// Trimming an already trimmed sheet changes nothing.
pub fn trim_sheet(sheet: &mut Sheet) {
    let (max_row, max_col) = match content_bounds(sheet) {
        Some((r, c)) => (r + 1, c + 1),
        None => (1, 1),
    };

    let before = sheet.cells.len();
    sheet.cells.retain(|d| d.r < max_row && d.c < max_col);
    sheet.row_heights.retain(|r, _| *r < max_row);
    sheet.col_widths.retain(|c, _| *c < max_col);

    sheet.merges.retain_mut(|m| {
        if m.start_row >= max_row || m.start_col >= max_col {
            return false;
        }
        m.end_row = m.end_row.min(max_row - 1);
        m.end_col = m.end_col.min(max_col - 1);
        // A clipped merge covering one cell is no merge at all
        m.end_row > m.start_row || m.end_col > m.start_col
    });

    if sheet.max_row != max_row || sheet.max_col != max_col || before != sheet.cells.len() {
        tracing::debug!(
            sheet = %sheet.name,
            from_rows = sheet.max_row,
            from_cols = sheet.max_col,
            rows = max_row,
            cols = max_col,
            "trimmed sheet"
        );
    }
    sheet.max_row = max_row;
    sheet.max_col = max_col;
    sheet.rebuild_cell_index();
}
