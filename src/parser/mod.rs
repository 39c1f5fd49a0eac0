//! XLSX workbook reader
//!
//! Opens the ZIP package, reads the parts shared by all sheets (relationships,
//! theme, shared strings, styles) and then each worksheet in workbook order.
//! Only what the map needs is kept: cell values, formulas with their cached
//! results, resolved fill and text colors, explicit row heights and column
//! widths, and merged ranges.

mod relationships;
pub(crate) mod styles;
mod worksheet;

use std::io::Cursor;
use zip::ZipArchive;

use crate::error::Result;
use crate::types::Workbook;

use relationships::{
    get_sheet_info, parse_shared_strings, parse_stylesheet, parse_theme,
    parse_workbook_relationships,
};
use styles::resolve_cell_colors;
use worksheet::parse_sheet;

/// Parse an XLSX file from bytes.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let span = tracing::info_span!("parse", bytes = data.len());
    let _enter = span.enter();

    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    let rels = parse_workbook_relationships(&mut archive);
    let theme = parse_theme(&mut archive, rels.theme.as_deref());
    let shared_strings = parse_shared_strings(&mut archive, rels.shared_strings.as_deref());
    let stylesheet = parse_stylesheet(&mut archive, rels.styles.as_deref())?;
    let cell_colors = resolve_cell_colors(&stylesheet, &theme);
    tracing::debug!(
        shared_strings = shared_strings.len(),
        fonts = stylesheet.fonts.len(),
        fills = stylesheet.fills.len(),
        cell_xfs = stylesheet.cell_xfs.len(),
        "read workbook parts"
    );

    let sheet_info = get_sheet_info(&mut archive, &rels.worksheets)?;
    let mut sheets = Vec::with_capacity(sheet_info.len());
    for info in &sheet_info {
        sheets.push(parse_sheet(
            &mut archive,
            info,
            &shared_strings,
            &cell_colors,
        )?);
    }

    tracing::info!(sheets = sheets.len(), "parsed workbook");
    Ok(Workbook { sheets, theme })
}
