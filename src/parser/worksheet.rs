//! Worksheet parsing: cells, formulas, row heights, column widths, merges.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_range, parse_cell_ref_bytes, MAX_COL};
use crate::error::{MapError, Result};
use crate::formula::SharedFormulas;
use crate::types::{Cell, CellContent, CellValue, MergeRange, Sheet};
use crate::xml_helpers::{attr_f64, attr_string, attr_u32, read_text};

use super::styles::CellColors;

/// Sheet metadata from workbook.xml
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}

/// Parse a merge range like "A1:B2". Single-cell ranges are not merges.
fn parse_merge_ref(ref_str: &str) -> Option<MergeRange> {
    let (start_row, start_col, end_row, end_col) = parse_cell_range(ref_str)?;
    if start_row == end_row && start_col == end_col {
        return None;
    }
    Some(MergeRange {
        start_row,
        start_col,
        end_row,
        end_col,
    })
}

/// The `<f>` element of a cell
#[derive(Debug, Default)]
struct FormulaElement {
    text: String,
    /// Group index of a shared formula (`t="shared" si=".."`)
    shared_index: Option<u32>,
}

impl FormulaElement {
    fn from_start(e: &BytesStart) -> Self {
        let shared = attr_string(e, b"t").as_deref() == Some("shared");
        Self {
            text: String::new(),
            shared_index: if shared { attr_u32(e, b"si") } else { None },
        }
    }
}

/// Everything read from one `<c>` element
#[derive(Debug, Default)]
struct RawCell {
    value: Option<String>,
    inline: Option<String>,
    formula: Option<FormulaElement>,
}

/// Read the children of a `<c>` element up to its end tag
fn read_cell_children<R: BufRead>(xml: &mut Reader<R>, buf: &mut Vec<u8>) -> RawCell {
    let mut raw = RawCell::default();
    loop {
        buf.clear();
        match xml.read_event_into(buf) {
            Ok(Event::Start(ref inner)) => match inner.local_name().as_ref() {
                b"v" => raw.value = Some(read_text(xml, b"v")),
                b"f" => {
                    let mut formula = FormulaElement::from_start(inner);
                    formula.text = read_text(xml, b"f");
                    raw.formula = Some(formula);
                }
                b"is" => raw.inline = Some(read_text(xml, b"is")),
                _ => {}
            },
            Ok(Event::Empty(ref inner)) => {
                if inner.local_name().as_ref() == b"f" {
                    raw.formula = Some(FormulaElement::from_start(inner));
                }
            }
            Ok(Event::End(ref inner)) => {
                if inner.local_name().as_ref() == b"c" {
                    break;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    raw
}

/// Typed value of a cell from its `t` attribute and raw `<v>`/`<is>` text
fn cell_value(raw: &RawCell, cell_type: CellTypeTag, shared_strings: &[String]) -> CellValue {
    if cell_type == CellTypeTag::Inline {
        return raw
            .inline
            .clone()
            .or_else(|| raw.value.clone())
            .map_or(CellValue::Blank, CellValue::Text);
    }
    let Some(value) = raw.value.as_deref() else {
        return CellValue::Blank;
    };
    match cell_type {
        CellTypeTag::Shared => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .map_or(CellValue::Blank, |s| CellValue::Text(s.clone())),
        CellTypeTag::Str | CellTypeTag::Inline => CellValue::Text(value.to_string()),
        CellTypeTag::Bool => CellValue::Bool(matches!(value.trim(), "1" | "true" | "TRUE")),
        CellTypeTag::Error => CellValue::Error(value.to_string()),
        CellTypeTag::Default => value
            .trim()
            .parse::<f64>()
            .map_or_else(|_| CellValue::Text(value.to_string()), CellValue::Number),
    }
}

/// Parse a single worksheet part into a [`Sheet`].
///
/// Shared formulas are expanded once the whole part has been read, since a
/// follower can only be shifted relative to its group's master.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
    cell_colors: &[CellColors],
) -> Result<Sheet> {
    let file = archive.by_name(&info.path)?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Sheet::new(&info.name);
    let mut shared = SharedFormulas::default();

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    let mut current_row: Option<u32> = None;
    // Column after the last cell of the current row, for cells without `r`
    let mut next_col: u32 = 0;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"dimension" => {
                        if let Some((_, _, end_row, end_col)) =
                            attr_string(e, b"ref").as_deref().and_then(parse_cell_range)
                        {
                            let area = (u64::from(end_row) + 1)
                                .saturating_mul(u64::from(end_col) + 1);
                            let reserve = usize::try_from(area.min(200_000)).unwrap_or(0);
                            sheet.cells.reserve(reserve);
                        }
                    }

                    b"row" => {
                        let row = attr_u32(e, b"r").map_or_else(
                            || current_row.map_or(0, |r| r.saturating_add(1)),
                            |r| r.saturating_sub(1),
                        );
                        current_row = Some(row);
                        next_col = 0;
                        if let Some(ht) = attr_f64(e, b"ht") {
                            sheet.set_row_height(row, ht);
                        }
                    }

                    b"col" => {
                        // <col min="2" max="4" width="12.5"/> covers B:D
                        let min = attr_u32(e, b"min").unwrap_or(1).max(1);
                        let max = attr_u32(e, b"max").unwrap_or(min).min(MAX_COL + 1);
                        if let Some(width) = attr_f64(e, b"width") {
                            for col in min..=max {
                                sheet.set_col_width(col - 1, width);
                            }
                        }
                    }

                    b"c" => {
                        let mut pos: Option<(u32, u32)> = None;
                        let mut cell_type = CellTypeTag::Default;
                        let mut style_idx: Option<u32> = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let (col, row) =
                                        parse_cell_ref_bytes(&attr.value).ok_or_else(|| {
                                            MapError::CellRef(format!(
                                                "{}: '{}'",
                                                info.name,
                                                String::from_utf8_lossy(&attr.value)
                                            ))
                                        })?;
                                    pos = Some((row, col));
                                }
                                b"t" => cell_type = parse_cell_type_tag(&attr.value),
                                b"s" => style_idx = parse_u32_bytes(&attr.value),
                                _ => {}
                            }
                        }
                        let (row, col) = pos.unwrap_or((current_row.unwrap_or(0), next_col));
                        next_col = col.saturating_add(1);

                        // Self-closing cells like <c r="A1" s="2"/> have no children
                        let raw = if is_start_event {
                            read_cell_children(&mut xml, &mut cell_buf)
                        } else {
                            RawCell::default()
                        };

                        let value = cell_value(&raw, cell_type, shared_strings);
                        let mut cell = match raw.formula {
                            Some(f) if !f.text.trim().is_empty() => {
                                let text = format!("={}", f.text.trim());
                                if let Some(si) = f.shared_index {
                                    shared.add_master(si, row, col, &text);
                                }
                                Cell::formula(&text, value)
                            }
                            Some(FormulaElement {
                                shared_index: Some(si),
                                ..
                            }) => {
                                shared.add_follower(si, row, col);
                                Cell::literal(value)
                            }
                            _ => Cell::literal(value),
                        };

                        // Cells without `s` use the default format
                        if let Some(colors) = cell_colors.get(style_idx.unwrap_or(0) as usize) {
                            cell.fill_color = colors.fill;
                            cell.text_color = colors.text;
                        }
                        sheet.set_cell(row, col, cell);
                    }

                    b"mergeCell" => {
                        if let Some(merge) = attr_string(e, b"ref").as_deref().and_then(parse_merge_ref)
                        {
                            sheet.add_merge(merge);
                        }
                    }

                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    expand_shared_formulas(&mut sheet, &shared);

    tracing::debug!(
        sheet = %sheet.name,
        cells = sheet.cells.len(),
        merges = sheet.merges.len(),
        rows = sheet.max_row,
        cols = sheet.max_col,
        "parsed worksheet"
    );
    Ok(sheet)
}

/// Give every shared formula follower its shifted formula, keeping the
/// cached value it was read with.
fn expand_shared_formulas(sheet: &mut Sheet, shared: &SharedFormulas) {
    if shared.is_empty() {
        return;
    }
    for (row, col, text) in shared.resolve() {
        let Some(mut cell) = sheet.cell_at(row, col).cloned() else {
            continue;
        };
        let cached = match cell.content {
            CellContent::Literal(v) => v,
            CellContent::Formula { cached, .. } => cached,
        };
        cell.content = CellContent::Formula { text, cached };
        sheet.set_cell(row, col, cell);
    }
}
