//! Pre-computed cell positions for a trimmed sheet.
//!
//! Column edges are accumulated left to right from each column's width
//! (explicit or default) and row edges top to bottom, with y decreasing.
//! Cell rectangles then come from two lookups instead of re-summing widths
//! for every cell.

use std::collections::HashMap;

use super::geometry::{col_width, row_height};
use crate::config::MapConfig;
use crate::types::Sheet;

/// Pre-computed layout data for a sheet
#[derive(Debug, Clone)]
pub struct SheetLayout {
    /// `col_positions[i]` = x of column i's left edge; one extra closing edge
    pub col_positions: Vec<f64>,
    /// `row_positions[i]` = y of row i's top edge; one extra closing edge
    pub row_positions: Vec<f64>,
    pub col_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    /// Merge info lookup by (row, col)
    pub merges: HashMap<(u32, u32), MergeInfo>,
}

/// Information about a merged cell region
#[derive(Debug, Clone, Copy)]
pub struct MergeInfo {
    /// True if this cell is the top-left anchor of the merge
    pub is_anchor: bool,
    pub row_span: u32,
    pub col_span: u32,
}

/// A cell's box relative to the tile origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SheetLayout {
    pub fn new(sheet: &Sheet, config: &MapConfig) -> Self {
        let cols = sheet.max_col as usize;
        let rows = sheet.max_row as usize;

        let mut col_positions = Vec::with_capacity(cols + 1);
        let mut col_widths = Vec::with_capacity(cols);
        let mut x = 0.0;
        for col in 0..sheet.max_col {
            col_positions.push(x);
            let w = col_width(sheet, col, config);
            col_widths.push(w);
            x += w;
        }
        col_positions.push(x);

        let mut row_positions = Vec::with_capacity(rows + 1);
        let mut row_heights = Vec::with_capacity(rows);
        let mut y = 0.0;
        for row in 0..sheet.max_row {
            row_positions.push(y);
            let h = row_height(sheet, row, config);
            row_heights.push(h);
            y -= h;
        }
        row_positions.push(y);

        let mut merges = HashMap::new();
        for m in &sheet.merges {
            let row_span = m.end_row.saturating_sub(m.start_row) + 1;
            let col_span = m.end_col.saturating_sub(m.start_col) + 1;
            for r in m.start_row..=m.end_row {
                for c in m.start_col..=m.end_col {
                    merges.insert(
                        (r, c),
                        MergeInfo {
                            is_anchor: m.is_anchor(r, c),
                            row_span,
                            col_span,
                        },
                    );
                }
            }
        }

        Self {
            col_positions,
            row_positions,
            col_widths,
            row_heights,
            merges,
        }
    }

    /// Box of the cell at (row, col).
    ///
    /// A merge anchor spans the whole merged region. Other cells of a merge
    /// have zero width so they draw nothing over the anchor.
    pub fn cell_rect(&self, row: u32, col: u32) -> CellRect {
        let x = self.col_positions.get(col as usize).copied().unwrap_or(0.0);
        let y = self.row_positions.get(row as usize).copied().unwrap_or(0.0);
        let mut width = self.col_widths.get(col as usize).copied().unwrap_or(0.0);
        let mut height = self.row_heights.get(row as usize).copied().unwrap_or(0.0);

        if let Some(merge) = self.merges.get(&(row, col)) {
            if !merge.is_anchor {
                width = 0.0;
            } else {
                let end_col = col.saturating_add(merge.col_span) as usize;
                let end_row = row.saturating_add(merge.row_span) as usize;
                width = self.col_positions.get(end_col).copied().unwrap_or(x) - x;
                height = y - self.row_positions.get(end_row).copied().unwrap_or(y);
            }
        }

        CellRect {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{Cell, MergeRange};

    fn sheet() -> Sheet {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(2, 2, Cell::number(1.0));
        sheet.set_col_width(1, 4.0);
        sheet.set_row_height(1, 40.0);
        sheet
    }

    #[test]
    fn test_basic_layout() {
        let layout = SheetLayout::new(&sheet(), &MapConfig::default());
        let default_w = 8.43 * 7.5;
        assert_eq!(
            layout.col_positions,
            vec![0.0, default_w, default_w + 30.0, default_w + 30.0 + default_w]
        );
        assert_eq!(layout.row_positions, vec![0.0, -15.0, -55.0, -70.0]);
    }

    #[test]
    fn test_cell_rect() {
        let layout = SheetLayout::new(&sheet(), &MapConfig::default());
        let rect = layout.cell_rect(1, 1);
        assert_eq!(rect.x, 8.43 * 7.5);
        assert_eq!(rect.y, -15.0);
        assert_eq!(rect.width, 30.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn test_merged_cells() {
        let mut sheet = sheet();
        sheet.add_merge(MergeRange {
            start_row: 0,
            start_col: 0,
            end_row: 1,
            end_col: 1,
        });
        let layout = SheetLayout::new(&sheet, &MapConfig::default());

        let anchor = layout.cell_rect(0, 0);
        assert_eq!(anchor.width, 8.43 * 7.5 + 30.0);
        assert_eq!(anchor.height, 55.0);

        let covered = layout.cell_rect(1, 1);
        assert_eq!(covered.width, 0.0);
        assert_eq!(covered.x, 8.43 * 7.5);

        let outside = layout.cell_rect(2, 2);
        assert_eq!(outside.width, 8.43 * 7.5);
    }
}
