//! Sheet dimensions in map units.
//!
//! Heights are accumulated downward, so a sheet's height is negative: row 0
//! starts at y = 0 and each row moves the next one down by its height.

use crate::config::MapConfig;
use crate::types::Sheet;

/// Overall extent of a trimmed sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub width: f64,
    /// Always <= 0
    pub height: f64,
}

impl SheetGeometry {
    pub fn measure(sheet: &Sheet, config: &MapConfig) -> Self {
        Self {
            width: sheet_width(sheet, config),
            height: sheet_height(sheet, config),
        }
    }
}

/// Sum of the explicitly sized columns, scaled to points.
///
/// Columns without a width record do not contribute.
pub fn sheet_width(sheet: &Sheet, config: &MapConfig) -> f64 {
    sheet
        .col_widths
        .values()
        .map(|w| config.scaled_width(*w))
        .sum()
}

/// Negative sum of the heights of rows `0..max_row`.
pub fn sheet_height(sheet: &Sheet, config: &MapConfig) -> f64 {
    let explicit: Vec<f64> = sheet
        .row_heights
        .range(..sheet.max_row)
        .map(|(_, h)| *h)
        .collect();
    let implicit_rows = u32::try_from(explicit.len())
        .map(|n| sheet.max_row.saturating_sub(n))
        .unwrap_or(0);
    let total = explicit.iter().sum::<f64>() + f64::from(implicit_rows) * config.default_row_height;
    -total
}

/// Height of one row, explicit or default
pub fn row_height(sheet: &Sheet, row: u32, config: &MapConfig) -> f64 {
    sheet
        .row_heights
        .get(&row)
        .copied()
        .unwrap_or(config.default_row_height)
}

/// Width of one column in points, explicit or default
pub fn col_width(sheet: &Sheet, col: u32, config: &MapConfig) -> f64 {
    let chars = sheet
        .col_widths
        .get(&col)
        .copied()
        .unwrap_or(config.default_col_width);
    config.scaled_width(chars)
}
