//! Workbook → map document.
//!
//! All sheets are trimmed first, because the tile grid depends on the
//! extents of every sheet. Each sheet is then laid out on its tile, its
//! formulas are analyzed once (signature and references from one token
//! stream), and its dependency graph feeds the cell records.

use std::collections::HashMap;

use tracing::{debug, info, info_span, warn};

use crate::cell_ref::cell_name;
use crate::config::MapConfig;
use crate::error::{Diagnostic, Result};
use crate::extract::{extract_cells, SheetContext};
use crate::formula::{canonicalize, extract_references, tokenize, SignatureTable};
use crate::graph::DependencyGraph;
use crate::layout::{col_lines, row_lines, trim_sheet, SheetGeometry, SheetLayout, Tiling};
use crate::types::{MapDocument, Point, Sheet, SheetMap, Workbook};

/// Build the map of `workbook`.
///
/// Sheets are trimmed in place. Formula signatures are interned into `table`,
/// so a table shared between calls keeps ids stable across workbooks.
/// Per-cell problems end up in [`MapDocument::diagnostics`]; a dependency
/// cycle aborts the whole build.
pub fn build_map(
    workbook: &mut Workbook,
    config: &MapConfig,
    table: &SignatureTable,
) -> Result<MapDocument> {
    let span = info_span!("build_map", sheets = workbook.sheets.len());
    let _enter = span.enter();

    for sheet in &mut workbook.sheets {
        trim_sheet(sheet);
    }

    let geometries: Vec<SheetGeometry> = workbook
        .sheets
        .iter()
        .map(|sheet| SheetGeometry::measure(sheet, config))
        .collect();
    let mut document = MapDocument::default();
    let Some(tiling) = Tiling::new(&geometries, config.tile_gap) else {
        info!("workbook has no sheets");
        return Ok(document);
    };

    for (index, (sheet, geometry)) in workbook.sheets.iter().zip(&geometries).enumerate() {
        let offset = tiling.offset(index);
        let map = build_sheet(
            sheet,
            index,
            *geometry,
            offset,
            config,
            table,
            &mut document.diagnostics,
        )?;
        document.sheets.push((config.sheet_label(index), map));
    }

    info!(
        sheets = document.sheets.len(),
        signatures = table.len(),
        diagnostics = document.diagnostics.len(),
        "map built"
    );
    Ok(document)
}

fn build_sheet(
    sheet: &Sheet,
    index: usize,
    geometry: SheetGeometry,
    offset: Point,
    config: &MapConfig,
    table: &SignatureTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<SheetMap> {
    let span = info_span!("sheet", index, name = %sheet.name);
    let _enter = span.enter();
    debug!(
        rows = sheet.max_row,
        cols = sheet.max_col,
        width = geometry.width,
        height = geometry.height,
        x = offset.0,
        y = offset.1,
        "sheet geometry"
    );

    let analysis = analyze_formulas(sheet, table, diagnostics);
    let mut graph =
        DependencyGraph::build(&sheet.name, sheet.max_row, sheet.max_col, analysis.uses)?;
    graph.compute_metrics()?;
    debug!(edges = graph.edge_count(), "dependency graph");

    let layout = SheetLayout::new(sheet, config);
    let cells = extract_cells(&SheetContext {
        sheet,
        index,
        offset,
        layout: &layout,
        graph: &graph,
        signatures: &analysis.signatures,
        config,
    });

    Ok(SheetMap {
        rows: row_lines(sheet, geometry, offset, config),
        cols: col_lines(sheet, geometry, offset, config),
        cells,
        total_width: geometry.width,
        total_height: geometry.height,
    })
}

#[derive(Debug, Default)]
struct FormulaAnalysis {
    /// Signature id per formula cell
    signatures: HashMap<(u32, u32), u32>,
    /// (formula cell, referenced cells) in row-major order
    uses: Vec<((u32, u32), Vec<(u32, u32)>)>,
}

fn analyze_formulas(
    sheet: &Sheet,
    table: &SignatureTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> FormulaAnalysis {
    let mut formulas: Vec<(u32, u32, &str)> = sheet
        .cells
        .iter()
        .filter_map(|d| d.cell.formula_text().map(|f| (d.r, d.c, f)))
        .collect();
    formulas.sort_unstable_by_key(|&(r, c, _)| (r, c));

    let mut analysis = FormulaAnalysis::default();
    for (row, col, text) in formulas {
        let cell = cell_name(row, col);
        let tokens = match tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                let diagnostic = Diagnostic::FormulaParse {
                    sheet: sheet.name.clone(),
                    cell,
                    message: e.to_string(),
                };
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
                continue;
            }
        };

        let signature = table.intern(canonicalize(&tokens));
        analysis.signatures.insert((row, col), signature.id);

        let refs = extract_references(&tokens, sheet.max_row, sheet.max_col);
        for skipped in refs.skipped {
            let diagnostic = Diagnostic::UnsupportedReference {
                sheet: sheet.name.clone(),
                cell: cell.clone(),
                reference: skipped.reference,
                reason: skipped.reason,
            };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        }
        analysis.uses.push(((row, col), refs.cells));
    }
    analysis
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
    use crate::error::{MapError, UnsupportedReason};
    use crate::types::{Cell, CellValue, LineAxis};

    fn workbook(sheets: Vec<Sheet>) -> Workbook {
        Workbook {
            sheets,
            ..Workbook::default()
        }
    }

    fn sheet_with(name: &str, cells: &[(u32, u32, Cell)]) -> Sheet {
        let mut sheet = Sheet::new(name);
        for (r, c, cell) in cells {
            sheet.set_cell(*r, *c, cell.clone());
        }
        sheet
    }

    #[test]
    fn test_simple_dependency() {
        let mut wb = workbook(vec![sheet_with(
            "Data",
            &[
                (0, 0, Cell::number(5.0)),
                (0, 1, Cell::formula("=A1*2", CellValue::Number(10.0))),
            ],
        )]);
        let doc = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap();

        let sheet = doc.sheet("sheet0").unwrap();
        assert_eq!(sheet.cells.len(), 2);
        let (a1, b1) = (&sheet.cells[0], &sheet.cells[1]);
        assert_eq!(a1.used_by, vec!["Sheet0!B1"]);
        assert_eq!(b1.uses, vec!["Sheet0!A1"]);
        assert_eq!(b1.value, "10");
        assert_eq!((b1.weight, b1.rank), (1, 1));
        assert_eq!(b1.formula_type, Some(0));
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_workbook() {
        let doc =
            build_map(&mut Workbook::default(), &MapConfig::default(), &SignatureTable::new())
                .unwrap();
        assert!(doc.sheets.is_empty());
    }

    #[test]
    fn test_empty_sheet_degrades_to_a1() {
        let mut wb = workbook(vec![Sheet::new("Blank")]);
        let doc = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap();
        let sheet = doc.sheet("sheet0").unwrap();
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].name, "Sheet0!A1");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.cols.len(), 1);
        assert!(sheet.rows.iter().all(|l| l.axis == LineAxis::Row));
    }

    #[test]
    fn test_sheets_are_tiled() {
        let sheets = (0..4)
            .map(|i| {
                let mut s = sheet_with(&format!("S{i}"), &[(i, 0, Cell::number(1.0))]);
                s.set_col_width(0, 10.0);
                s
            })
            .collect();
        let mut wb = workbook(sheets);
        let doc = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap();

        // widest sheet 75, tallest -60
        let origins: Vec<Point> = doc
            .sheets
            .iter()
            .map(|(_, map)| map.cells[0].coord)
            .collect();
        assert_eq!(
            origins,
            vec![(0.0, 0.0), (125.0, 0.0), (0.0, -110.0), (125.0, -110.0)]
        );
        assert_eq!(doc.sheets[3].0, "sheet3");
    }

    #[test]
    fn test_signature_ids_shared_across_sheets() {
        let mut wb = workbook(vec![
            sheet_with(
                "A",
                &[(0, 1, Cell::formula("=A1+1", CellValue::Number(1.0)))],
            ),
            sheet_with(
                "B",
                &[(0, 2, Cell::formula("=B1+7", CellValue::Number(7.0)))],
            ),
        ]);
        let table = SignatureTable::new();
        let doc = build_map(&mut wb, &MapConfig::default(), &table).unwrap();
        assert_eq!(doc.sheets[0].1.cells[1].formula_type, Some(0));
        assert_eq!(doc.sheets[1].1.cells[2].formula_type, Some(0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_bad_formula_is_diagnostic() {
        let mut wb = workbook(vec![sheet_with(
            "S",
            &[(0, 0, Cell::formula("=SUM(A1", CellValue::Blank))],
        )]);
        let doc = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap();
        let a1 = &doc.sheets[0].1.cells[0];
        assert_eq!(a1.formula.as_deref(), Some("=SUM(A1"));
        assert_eq!(a1.formula_type, None);
        assert!(a1.uses.is_empty());
        assert!(matches!(
            doc.diagnostics[0],
            Diagnostic::FormulaParse { .. }
        ));
    }

    #[test]
    fn test_cross_sheet_reference_dropped() {
        let mut wb = workbook(vec![sheet_with(
            "S",
            &[
                (0, 0, Cell::number(1.0)),
                (0, 1, Cell::formula("=A1+Other!A1", CellValue::Number(2.0))),
            ],
        )]);
        let doc = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap();
        assert_eq!(doc.sheets[0].1.cells[1].uses, vec!["Sheet0!A1"]);
        assert_eq!(
            doc.diagnostics,
            vec![Diagnostic::UnsupportedReference {
                sheet: "S".to_string(),
                cell: "B1".to_string(),
                reference: "Other!A1".to_string(),
                reason: UnsupportedReason::CrossSheet,
            }]
        );
    }

    #[test]
    fn test_cycle_aborts() {
        let mut wb = workbook(vec![sheet_with(
            "Loop",
            &[
                (0, 0, Cell::formula("=B1", CellValue::Number(0.0))),
                (0, 1, Cell::formula("=A1", CellValue::Number(0.0))),
            ],
        )]);
        let err = build_map(&mut wb, &MapConfig::default(), &SignatureTable::new()).unwrap_err();
        match err {
            MapError::CyclicDependency { sheet, .. } => assert_eq!(sheet, "Loop"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }
}
