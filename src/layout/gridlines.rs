//! Row and column separator lines of one sheet tile.

use super::geometry::{row_height, SheetGeometry};
use crate::config::MapConfig;
use crate::types::{GridLine, LineAxis, Point, Sheet};

/// One horizontal line at the top edge of every row, plus a closing line
/// under the last row: `max_row + 1` lines spanning the sheet width.
pub fn row_lines(
    sheet: &Sheet,
    geometry: SheetGeometry,
    offset: Point,
    config: &MapConfig,
) -> Vec<GridLine> {
    let (ox, oy) = offset;
    let mut lines = Vec::with_capacity(sheet.max_row as usize + 1);
    let mut y = 0.0;
    for row in 0..sheet.max_row {
        lines.push(GridLine::new(
            LineAxis::Row,
            (ox, y + oy),
            (geometry.width + ox, y + oy),
        ));
        y -= row_height(sheet, row, config);
    }
    lines.push(GridLine::new(
        LineAxis::Row,
        (ox, y + oy),
        (geometry.width + ox, y + oy),
    ));
    lines
}

/// One vertical line at the left edge of every explicitly sized column, in
/// column order, plus a closing line: `explicit_columns + 1` lines spanning
/// the (negative) sheet height.
pub fn col_lines(
    sheet: &Sheet,
    geometry: SheetGeometry,
    offset: Point,
    config: &MapConfig,
) -> Vec<GridLine> {
    let (ox, oy) = offset;
    let mut lines = Vec::with_capacity(sheet.col_widths.len() + 1);
    let mut x = 0.0;
    for width in sheet.col_widths.values() {
        lines.push(GridLine::new(
            LineAxis::Column,
            (x + ox, oy),
            (x + ox, geometry.height + oy),
        ));
        x += config.scaled_width(*width);
    }
    lines.push(GridLine::new(
        LineAxis::Column,
        (x + ox, oy),
        (x + ox, geometry.height + oy),
    ));
    lines
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn sheet() -> Sheet {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(2, 2, Cell::number(1.0));
        sheet.set_row_height(0, 20.0);
        sheet.set_col_width(0, 10.0);
        sheet.set_col_width(2, 2.0);
        sheet
    }

    #[test]
    fn test_row_lines() {
        let sheet = sheet();
        let config = MapConfig::default();
        let geom = SheetGeometry::measure(&sheet, &config);
        let rows = row_lines(&sheet, geom, (100.0, -10.0), &config);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].path, [(100.0, -10.0), (190.0, -10.0)]);
        assert_eq!(rows[1].path[0], (100.0, -30.0));
        assert_eq!(rows[3].path[0], (100.0, -60.0));
        assert_eq!(rows[3].path[1].1, geom.height - 10.0);
        assert!(rows.iter().all(|l| l.axis == LineAxis::Row));
    }

    #[test]
    fn test_col_lines_follow_explicit_columns() {
        let sheet = sheet();
        let config = MapConfig::default();
        let geom = SheetGeometry::measure(&sheet, &config);
        let cols = col_lines(&sheet, geom, (0.0, 0.0), &config);

        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].path, [(0.0, 0.0), (0.0, -50.0)]);
        assert_eq!(cols[1].path[0], (75.0, 0.0));
        assert_eq!(cols[2].path[0], (90.0, 0.0));
        assert_eq!(cols[2].path[0].0, geom.width);
    }

    #[test]
    fn test_single_cell_sheet() {
        let sheet = Sheet {
            max_row: 1,
            max_col: 1,
            ..Sheet::new("Empty")
        };
        let config = MapConfig::default();
        let geom = SheetGeometry::measure(&sheet, &config);
        assert_eq!(row_lines(&sheet, geom, (0.0, 0.0), &config).len(), 2);
        assert_eq!(col_lines(&sheet, geom, (0.0, 0.0), &config).len(), 1);
    }
}
