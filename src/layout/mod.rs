//! Layout engine: sheet trimming, dimensions, tiling of sheets on one
//! canvas, gridlines and per-cell rectangles.
//!
//! Coordinates are in points with y decreasing downward: a sheet's top-left
//! corner is its tile offset and every row moves further into negative y.

mod geometry;
mod gridlines;
mod sheet_layout;
mod tiling;
mod trim;

pub use geometry::{col_width, row_height, sheet_height, sheet_width, SheetGeometry};
pub use gridlines::{col_lines, row_lines};
pub use sheet_layout::{CellRect, MergeInfo, SheetLayout};
pub use tiling::{grid_size, Tiling};
pub use trim::trim_sheet;
