//! Per-cell records of a sheet tile.

use std::collections::HashMap;

use crate::cell_ref::cell_name;
use crate::config::MapConfig;
use crate::graph::DependencyGraph;
use crate::layout::SheetLayout;
use crate::types::{CellRecord, CellValue, Point, Sheet};

/// Everything needed to turn one trimmed sheet into cell records
pub struct SheetContext<'a> {
    pub sheet: &'a Sheet,
    /// Position of the sheet in the workbook
    pub index: usize,
    /// Tile origin
    pub offset: Point,
    pub layout: &'a SheetLayout,
    pub graph: &'a DependencyGraph,
    /// Signature id of each formula cell that tokenized
    pub signatures: &'a HashMap<(u32, u32), u32>,
    pub config: &'a MapConfig,
}

/// One record per grid coordinate, row-major.
pub fn extract_cells(ctx: &SheetContext<'_>) -> Vec<CellRecord> {
    let sheet = ctx.sheet;
    let config = ctx.config;
    let (ox, oy) = ctx.offset;
    let qualify = |(r, c): (u32, u32)| config.qualified_name(ctx.index, &cell_name(r, c));

    let size = (sheet.max_row as usize).saturating_mul(sheet.max_col as usize);
    let mut records = Vec::with_capacity(size);
    for (row, col, name) in sheet.grid_names() {
        let rect = ctx.layout.cell_rect(row, col);
        let cell = sheet.cell_at(row, col);
        let node = ctx.graph.node((row, col));

        let shown = cell.map_or(CellValue::Blank, |c| c.display_value().clone());
        records.push(CellRecord {
            name: config.qualified_name(ctx.index, &name),
            coord: (rect.x + ox, rect.y + oy),
            height: rect.height,
            width: rect.width,
            value: clip_to_width(&shown.to_string(), rect.width, config.char_width),
            bg_color: cell
                .and_then(|c| c.fill_color)
                .unwrap_or(config.default_fill),
            text_color: cell
                .and_then(|c| c.text_color)
                .unwrap_or(config.default_text_color),
            formula: cell.and_then(|c| c.formula_text()).map(str::to_string),
            formula_type: ctx.signatures.get(&(row, col)).copied(),
            uses: node
                .map(|n| n.uses.iter().copied().map(qualify).collect())
                .unwrap_or_default(),
            used_by: node
                .map(|n| n.used_by.iter().copied().map(qualify).collect())
                .unwrap_or_default(),
            weight: node.map_or(0, |n| n.weight),
            rank: node.map_or(0, |n| n.rank),
        });
    }
    records
}

/// Truncate each line of `text` to what fits in `width`, marking cut lines
/// with `...`.
///
/// The line budget is `floor(width / char_width)` characters.
pub fn clip_to_width(text: &str, width: f64, char_width: f64) -> String {
    let max_chars = max_chars(width, char_width);
    text.lines()
        .map(|line| {
            if line.chars().count() > max_chars {
                let mut clipped: String = line.chars().take(max_chars).collect();
                clipped.push_str("...");
                clipped
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The clamp keeps the cast in range; NaN saturates to 0
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn max_chars(width: f64, char_width: f64) -> usize {
    if char_width <= 0.0 {
        return usize::MAX;
    }
    (width / char_width).floor().clamp(0.0, u32::MAX.into()) as usize
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
    use crate::types::{Cell, MergeRange, Rgba};
    use test_case::test_case;

    #[test_case("hello", 60.0, "hello" ; "fits")]
    #[test_case("hello world", 30.0, "hello..." ; "cut")]
    #[test_case("abcdefgh\nab", 24.0, "abcd...\nab" ; "per line")]
    #[test_case("abc", 0.0, "..." ; "zero width")]
    #[test_case("", 0.0, "" ; "empty")]
    #[test_case("ab\r\ncd", 60.0, "ab\ncd" ; "crlf normalized")]
    fn test_clip(text: &str, width: f64, expected: &str) {
        assert_eq!(clip_to_width(text, width, 6.0), expected);
    }

    #[test]
    fn test_clip_counts_chars_not_bytes() {
        assert_eq!(clip_to_width("éééé", 12.0, 6.0), "éé...");
    }

    fn records(sheet: &Sheet, offset: Point) -> Vec<CellRecord> {
        let config = MapConfig::default();
        let layout = SheetLayout::new(sheet, &config);
        let mut graph = DependencyGraph::build(
            "Sheet0",
            sheet.max_row,
            sheet.max_col,
            vec![((0, 1), vec![(0, 0)])],
        )
        .unwrap();
        graph.compute_metrics().unwrap();
        let signatures = HashMap::from([((0, 1), 0)]);
        extract_cells(&SheetContext {
            sheet,
            index: 0,
            offset,
            layout: &layout,
            graph: &graph,
            signatures: &signatures,
            config: &config,
        })
    }

    #[test]
    fn test_records_carry_graph_and_style() {
        let mut sheet = Sheet::new("S");
        let mut a1 = Cell::number(5.0);
        a1.fill_color = Some(Rgba::new(255, 0, 0, 255));
        sheet.set_cell(0, 0, a1);
        sheet.set_cell(0, 1, Cell::formula("=A1*2", CellValue::Number(10.0)));
        sheet.set_cell(1, 0, Cell::text("note"));

        let cells = records(&sheet, (10.0, -20.0));
        assert_eq!(cells.len(), 4);

        let a1 = &cells[0];
        assert_eq!(a1.name, "Sheet0!A1");
        assert_eq!(a1.coord, (10.0, -20.0));
        assert_eq!(a1.value, "5");
        assert_eq!(a1.bg_color, Rgba::new(255, 0, 0, 255));
        assert_eq!(a1.text_color, Rgba::BLACK);
        assert_eq!(a1.used_by, vec!["Sheet0!B1"]);
        assert_eq!(a1.formula, None);
        assert_eq!(a1.formula_type, None);

        let b1 = &cells[1];
        assert_eq!(b1.value, "10");
        assert_eq!(b1.formula.as_deref(), Some("=A1*2"));
        assert_eq!(b1.formula_type, Some(0));
        assert_eq!(b1.uses, vec!["Sheet0!A1"]);
        assert_eq!((b1.weight, b1.rank), (1, 1));
        assert_eq!(b1.bg_color, Rgba::WHITE);

        let b2 = &cells[3];
        assert_eq!(b2.name, "Sheet0!B2");
        assert_eq!(b2.value, "");
        assert_eq!(b2.coord.1, -35.0);
    }

    #[test]
    fn test_merged_non_anchor_has_zero_width() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(0, 0, Cell::text("merged title"));
        sheet.set_cell(0, 1, Cell::formula("=A1", CellValue::Text("x".into())));
        sheet.add_merge(MergeRange {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 1,
        });

        let cells = records(&sheet, (0.0, 0.0));
        let default_w = 8.43 * 7.5;
        assert_eq!(cells[0].width, default_w + default_w);
        assert_eq!(cells[0].value, "merged title");
        assert_eq!(cells[1].width, 0.0);
        assert_eq!(cells[1].value, "...");
        assert_eq!(cells[1].coord.0, default_w);
    }
}
