use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::*;
use crate::cell_ref::cell_name;

/// A complete workbook as handed to the map builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Theme colors the cell colors were resolved against
    #[serde(default)]
    pub theme: Theme,
}

/// A merged region; the top-left cell is the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergeRange {
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }

    pub fn is_anchor(&self, row: u32, col: u32) -> bool {
        row == self.start_row && col == self.start_col
    }
}

/// A single worksheet
///
/// `max_row`/`max_col` are extents (one past the last 0-indexed row/col), so
/// the grid spans `0..max_row` x `0..max_col`. Cells outside `cells` are blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    /// Sparse representation: Vec of (row, col, cell)
    pub cells: Vec<CellData>,
    /// Position index for fast cell lookup (not serialized).
    #[serde(skip)]
    pub(crate) cell_index: HashMap<(u32, u32), usize>,
    pub merges: Vec<MergeRange>,
    /// Explicit column widths in characters, keyed by 0-indexed column
    pub col_widths: BTreeMap<u32, f64>,
    /// Explicit row heights in points, keyed by 0-indexed row
    pub row_heights: BTreeMap<u32, f64>,
    pub max_row: u32,
    pub max_col: u32,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Store a cell, replacing any previous cell at the same position.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        if self.cell_index.len() != self.cells.len() {
            self.rebuild_cell_index();
        }
        if let Some(&idx) = self.cell_index.get(&(row, col)) {
            if let Some(slot) = self.cells.get_mut(idx) {
                slot.cell = cell;
                return;
            }
        }
        self.cell_index.insert((row, col), self.cells.len());
        self.cells.push(CellData { r: row, c: col, cell });
        self.max_row = self.max_row.max(row.saturating_add(1));
        self.max_col = self.max_col.max(col.saturating_add(1));
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) {
        self.col_widths.insert(col, width);
    }

    pub fn add_merge(&mut self, merge: MergeRange) {
        self.merges.push(merge);
    }

    /// Rebuild the position index after `cells` was modified directly.
    pub fn rebuild_cell_index(&mut self) {
        self.cell_index = self
            .cells
            .iter()
            .enumerate()
            .map(|(idx, data)| ((data.r, data.c), idx))
            .collect();
    }

    pub fn cell_at(&self, row: u32, col: u32) -> Option<&Cell> {
        if self.cell_index.len() == self.cells.len() {
            let idx = self.cell_index.get(&(row, col))?;
            return self.cells.get(*idx).map(|d| &d.cell);
        }
        // Index is stale (e.g. deserialized sheet); fall back to a scan
        self.cells
            .iter()
            .find(|d| d.r == row && d.c == col)
            .map(|d| &d.cell)
    }

    /// Merge range covering the position, if any
    pub fn merge_at(&self, row: u32, col: u32) -> Option<&MergeRange> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    /// A1-style coordinates of every grid position, row-major
    pub fn grid_names(&self) -> impl Iterator<Item = (u32, u32, String)> + '_ {
        (0..self.max_row)
            .flat_map(move |r| (0..self.max_col).map(move |c| (r, c, cell_name(r, c))))
    }
}
