//! Arrange the sheets of a workbook on one canvas.
//!
//! Sheets are placed row by row on a square-ish grid of `G = ceil(sqrt(N))`
//! columns. Every cell of the grid is as large as the widest and tallest
//! sheet plus a gap, so tiles never overlap.

use super::geometry::SheetGeometry;
use crate::types::Point;

/// `ceil(sqrt(n))` without going through floating point
pub fn grid_size(n: usize) -> usize {
    let mut g = 0usize;
    while g.saturating_mul(g) < n {
        g += 1;
    }
    g
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tiling {
    /// Tiles per grid row
    pub grid: usize,
    pub step_x: f64,
    /// Negative: grid rows move down
    pub step_y: f64,
}

impl Tiling {
    /// Grid for the given sheet extents; `None` when there are no sheets.
    pub fn new(sheets: &[SheetGeometry], gap: f64) -> Option<Self> {
        let max_width = sheets.iter().map(|g| g.width).reduce(f64::max)?;
        let min_height = sheets.iter().map(|g| g.height).reduce(f64::min)?;
        Some(Self {
            grid: grid_size(sheets.len()),
            step_x: max_width + gap,
            step_y: min_height - gap,
        })
    }

    /// (grid row, grid column) of sheet `index`
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        let grid = self.grid.max(1);
        (index / grid, index % grid)
    }

    /// Top-left corner of sheet `index`
    #[allow(clippy::cast_precision_loss)]
    pub fn offset(&self, index: usize) -> Point {
        let (row, col) = self.cell_of(index);
        (col as f64 * self.step_x, row as f64 * self.step_y)
    }
}
