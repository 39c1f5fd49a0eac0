//! Test fixtures for generating valid XLSX files in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::{SheetBuilder, StyleBuilder, XlsxBuilder};
//!
//! let xlsx = XlsxBuilder::new()
//!     .sheet(
//!         SheetBuilder::new("Sheet1")
//!             .cell("A1", 5, Some(StyleBuilder::new().bg_color("FFFF0000")))
//!             .formula("B1", "A1*2", 10),
//!     )
//!     .build();
//!
//! let workbook = sheetmap::parser::parse(&xlsx).unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

// ============================================================================
// Style Builder
// ============================================================================

/// A color as written in styles.xml
#[derive(Debug, Clone, PartialEq)]
pub enum ColorDef {
    Rgb(String),
    Theme(u32, Option<f64>),
    Indexed(u32),
    Auto,
}

impl ColorDef {
    fn attrs(&self) -> String {
        match self {
            ColorDef::Rgb(rgb) => format!(r#"rgb="{rgb}""#),
            ColorDef::Theme(theme, Some(tint)) => format!(r#"theme="{theme}" tint="{tint}""#),
            ColorDef::Theme(theme, None) => format!(r#"theme="{theme}""#),
            ColorDef::Indexed(idx) => format!(r#"indexed="{idx}""#),
            ColorDef::Auto => r#"auto="1""#.to_string(),
        }
    }
}

/// Builder for the colors of one cell format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBuilder {
    pub font_color: Option<ColorDef>,
    pub fill_color: Option<ColorDef>,
    pub pattern: Option<String>,
}

impl StyleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Font color as ARGB hex (e.g. "FFFF0000")
    #[must_use]
    pub fn font_color(mut self, rgb: &str) -> Self {
        self.font_color = Some(ColorDef::Rgb(rgb.to_string()));
        self
    }

    #[must_use]
    pub fn font_theme(mut self, theme: u32, tint: Option<f64>) -> Self {
        self.font_color = Some(ColorDef::Theme(theme, tint));
        self
    }

    #[must_use]
    pub fn font_auto(mut self) -> Self {
        self.font_color = Some(ColorDef::Auto);
        self
    }

    /// Solid fill as ARGB hex
    #[must_use]
    pub fn bg_color(mut self, rgb: &str) -> Self {
        self.fill_color = Some(ColorDef::Rgb(rgb.to_string()));
        self
    }

    #[must_use]
    pub fn bg_theme(mut self, theme: u32, tint: Option<f64>) -> Self {
        self.fill_color = Some(ColorDef::Theme(theme, tint));
        self
    }

    #[must_use]
    pub fn bg_indexed(mut self, idx: u32) -> Self {
        self.fill_color = Some(ColorDef::Indexed(idx));
        self
    }

    /// Pattern type of the fill (defaults to "solid" when a fill color is set)
    #[must_use]
    pub fn pattern(mut self, pattern_type: &str) -> Self {
        self.pattern = Some(pattern_type.to_string());
        self
    }
}

// ============================================================================
// Cell Value
// ============================================================================

/// Represents a cell value that can be added to a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A string value, stored in the shared string table.
    String(String),
    Number(f64),
    Boolean(bool),
    /// An error value (e.g., "#DIV/0!").
    Error(String),
    /// An inline string (not shared).
    InlineString(String),
    /// A string formula result (`t="str"`).
    FormulaString(String),
    /// An empty cell (style only).
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// ============================================================================
// Sheet Builder
// ============================================================================

/// The `<f>` element of a cell
#[derive(Debug, Clone)]
pub enum FormulaDef {
    Normal(String),
    SharedMaster {
        text: String,
        si: u32,
        range: String,
    },
    SharedFollower {
        si: u32,
    },
}

/// A cell in the sheet.
#[derive(Debug, Clone)]
pub struct CellEntry {
    pub cell_ref: String,
    pub value: CellValue,
    pub formula: Option<FormulaDef>,
    pub style: Option<StyleBuilder>,
}

/// Builder for a single worksheet.
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    pub name: String,
    pub cells: Vec<CellEntry>,
    pub merges: Vec<String>,
    pub col_widths: Vec<(u32, u32, f64)>,
    pub row_heights: Vec<(u32, f64)>,
    pub dimension: Option<String>,
}

fn strip_eq(text: &str) -> String {
    text.strip_prefix('=').unwrap_or(text).to_string()
}

impl SheetBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Add a cell with a value and optional style.
    #[must_use]
    pub fn cell<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        value: V,
        style: Option<StyleBuilder>,
    ) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: value.into(),
            formula: None,
            style,
        });
        self
    }

    /// Add an empty cell with only a style.
    #[must_use]
    pub fn styled_cell(mut self, cell_ref: &str, style: StyleBuilder) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: CellValue::Empty,
            formula: None,
            style: Some(style),
        });
        self
    }

    /// Add a formula cell with its cached value. A leading `=` is optional.
    #[must_use]
    pub fn formula<V: Into<CellValue>>(mut self, cell_ref: &str, text: &str, cached: V) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: cached.into(),
            formula: Some(FormulaDef::Normal(strip_eq(text))),
            style: None,
        });
        self
    }

    /// Add the master cell of shared formula group `si` covering `range`.
    #[must_use]
    pub fn shared_formula<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        si: u32,
        range: &str,
        text: &str,
        cached: V,
    ) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: cached.into(),
            formula: Some(FormulaDef::SharedMaster {
                text: strip_eq(text),
                si,
                range: range.to_string(),
            }),
            style: None,
        });
        self
    }

    /// Add a follower cell of shared formula group `si`.
    #[must_use]
    pub fn shared_follower<V: Into<CellValue>>(mut self, cell_ref: &str, si: u32, cached: V) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: cached.into(),
            formula: Some(FormulaDef::SharedFollower { si }),
            style: None,
        });
        self
    }

    /// Add a merge range (e.g., "A1:B2").
    #[must_use]
    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }

    /// Set column width (in characters) for 1-based columns `min..=max`.
    #[must_use]
    pub fn col_width(mut self, min: u32, max: u32, width: f64) -> Self {
        self.col_widths.push((min, max, width));
        self
    }

    /// Set the height (points) of 1-based `row`.
    #[must_use]
    pub fn row_height(mut self, row: u32, height: f64) -> Self {
        self.row_heights.push((row, height));
        self
    }

    /// Set an explicit `<dimension ref>`.
    #[must_use]
    pub fn dimension(mut self, range: &str) -> Self {
        self.dimension = Some(range.to_string());
        self
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

/// Builder for creating complete XLSX files.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    theme_colors: Option<Vec<String>>,
    indexed_colors: Option<Vec<String>>,
}

impl XlsxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Replace the 12 theme colors (RRGGBB, in lt1, dk1, lt2, dk2, accent1.. order).
    #[must_use]
    pub fn theme_colors(mut self, colors: Vec<String>) -> Self {
        self.theme_colors = Some(colors);
        self
    }

    /// Custom indexed palette (ARGB hex).
    #[must_use]
    pub fn indexed_colors(mut self, colors: Vec<String>) -> Self {
        self.indexed_colors = Some(colors);
        self
    }

    /// Build the XLSX file as bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut styles = StylesCollector::new();
        let mut shared_strings: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            for cell in &sheet.cells {
                if let Some(ref style) = cell.style {
                    styles.add_style(style);
                }
                if let CellValue::String(ref s) = cell.value {
                    if !shared_strings.contains(s) {
                        shared_strings.push(s.clone());
                    }
                }
            }
        }

        let mut parts: Vec<(String, String)> = vec![
            (
                "[Content_Types].xml".to_string(),
                generate_content_types(self.sheets.len()),
            ),
            ("_rels/.rels".to_string(), ROOT_RELS_XML.to_string()),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                generate_workbook_rels(self.sheets.len(), !shared_strings.is_empty()),
            ),
            ("xl/workbook.xml".to_string(), generate_workbook(&self.sheets)),
            (
                "xl/styles.xml".to_string(),
                styles.generate_styles_xml(self.indexed_colors.as_deref()),
            ),
            (
                "xl/theme/theme1.xml".to_string(),
                generate_theme(self.theme_colors.as_deref()),
            ),
        ];
        if !shared_strings.is_empty() {
            parts.push((
                "xl/sharedStrings.xml".to_string(),
                generate_shared_strings(&shared_strings),
            ));
        }
        for (i, sheet) in self.sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                generate_sheet_xml(sheet, &shared_strings, &styles),
            ));
        }

        let refs: Vec<(&str, &str)> = parts
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        zip_parts(&refs)
    }
}

/// Zip arbitrary parts into a package
pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().expect("Failed to finish ZIP").into_inner()
}

// ============================================================================
// Styles Collector
// ============================================================================

/// Collects and deduplicates cell formats.
#[derive(Debug)]
struct StylesCollector {
    fonts: Vec<Option<ColorDef>>,
    fills: Vec<(String, Option<ColorDef>)>,
    cell_xfs: Vec<(usize, usize)>,
    style_map: Vec<(StyleBuilder, u32)>,
}

impl StylesCollector {
    fn new() -> Self {
        Self {
            // Default font: theme text color
            fonts: vec![Some(ColorDef::Theme(1, None))],
            fills: vec![("none".to_string(), None), ("gray125".to_string(), None)],
            cell_xfs: vec![(0, 0)],
            style_map: Vec::new(),
        }
    }

    fn add_style(&mut self, style: &StyleBuilder) -> u32 {
        if let Some((_, idx)) = self.style_map.iter().find(|(s, _)| s == style) {
            return *idx;
        }

        let font_id = match &style.font_color {
            None => 0,
            Some(color) => {
                self.fonts.push(Some(color.clone()));
                self.fonts.len() - 1
            }
        };
        let fill_id = match (&style.fill_color, &style.pattern) {
            (None, None) => 0,
            (color, pattern) => {
                let pattern = pattern.clone().unwrap_or_else(|| "solid".to_string());
                self.fills.push((pattern, color.clone()));
                self.fills.len() - 1
            }
        };
        self.cell_xfs.push((font_id, fill_id));
        let idx = (self.cell_xfs.len() - 1) as u32;
        self.style_map.push((style.clone(), idx));
        idx
    }

    fn style_index(&self, style: &StyleBuilder) -> Option<u32> {
        self.style_map
            .iter()
            .find(|(s, _)| s == style)
            .map(|(_, idx)| *idx)
    }

    fn generate_styles_xml(&self, indexed_colors: Option<&[String]>) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        xml.push_str(&format!(r#"<fonts count="{}">"#, self.fonts.len()));
        for color in &self.fonts {
            xml.push_str(r#"<font><sz val="11"/>"#);
            if let Some(color) = color {
                xml.push_str(&format!("<color {}/>", color.attrs()));
            }
            xml.push_str(r#"<name val="Calibri"/><family val="2"/></font>"#);
        }
        xml.push_str("</fonts>");

        xml.push_str(&format!(r#"<fills count="{}">"#, self.fills.len()));
        for (pattern, color) in &self.fills {
            match color {
                Some(color) => xml.push_str(&format!(
                    r#"<fill><patternFill patternType="{pattern}"><fgColor {}/><bgColor indexed="64"/></patternFill></fill>"#,
                    color.attrs()
                )),
                None => xml.push_str(&format!(
                    r#"<fill><patternFill patternType="{pattern}"/></fill>"#
                )),
            }
        }
        xml.push_str("</fills>");

        xml.push_str(r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#);
        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.cell_xfs.len()));
        for (font_id, fill_id) in &self.cell_xfs {
            xml.push_str(&format!(
                r#"<xf numFmtId="0" fontId="{font_id}" fillId="{fill_id}" borderId="0" xfId="0"/>"#
            ));
        }
        xml.push_str("</cellXfs>");
        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);

        if let Some(colors) = indexed_colors {
            xml.push_str("<colors><indexedColors>");
            for rgb in colors {
                xml.push_str(&format!(r#"<rgbColor rgb="{rgb}"/>"#));
            }
            xml.push_str("</indexedColors></colors>");
        }

        xml.push_str("</styleSheet>");
        xml
    }
}

// ============================================================================
// Package parts
// ============================================================================

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn generate_content_types(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
  <Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.theme+xml"/>
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
  <Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("\n</Types>");
    xml
}

fn generate_workbook(sheets: &[SheetBuilder]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr/>
  <sheets>"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"
    <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("\n  </sheets>\n</workbook>");
    xml
}

fn generate_workbook_rels(sheet_count: usize, has_shared_strings: bool) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
  <Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    let next = sheet_count + 1;
    xml.push_str(&format!(
        r#"
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#,
        next,
        next + 1
    ));
    if has_shared_strings {
        xml.push_str(&format!(
            r#"
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
            next + 2
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}

fn generate_shared_strings(strings: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    );
    for s in strings {
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape_xml(s)
        ));
    }
    xml.push_str("</sst>");
    xml
}

const DEFAULT_THEME: [&str; 12] = [
    "FFFFFF", "000000", "E7E6E6", "44546A", "4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5",
    "70AD47", "0563C1", "954F72",
];

fn generate_theme(colors: Option<&[String]>) -> String {
    let color = |i: usize| -> String {
        colors
            .and_then(|c| c.get(i).cloned())
            .unwrap_or_else(|| DEFAULT_THEME[i].to_string())
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="{dk1}"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="{lt1}"/></a:lt1>
      <a:dk2><a:srgbClr val="{dk2}"/></a:dk2>
      <a:lt2><a:srgbClr val="{lt2}"/></a:lt2>
      <a:accent1><a:srgbClr val="{a1}"/></a:accent1>
      <a:accent2><a:srgbClr val="{a2}"/></a:accent2>
      <a:accent3><a:srgbClr val="{a3}"/></a:accent3>
      <a:accent4><a:srgbClr val="{a4}"/></a:accent4>
      <a:accent5><a:srgbClr val="{a5}"/></a:accent5>
      <a:accent6><a:srgbClr val="{a6}"/></a:accent6>
      <a:hlink><a:srgbClr val="{hl}"/></a:hlink>
      <a:folHlink><a:srgbClr val="{fhl}"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#,
        lt1 = color(0),
        dk1 = color(1),
        lt2 = color(2),
        dk2 = color(3),
        a1 = color(4),
        a2 = color(5),
        a3 = color(6),
        a4 = color(7),
        a5 = color(8),
        a6 = color(9),
        hl = color(10),
        fhl = color(11),
    )
}

fn generate_sheet_xml(
    sheet: &SheetBuilder,
    shared_strings: &[String],
    styles: &StylesCollector,
) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if let Some(ref dim) = sheet.dimension {
        xml.push_str(&format!(r#"<dimension ref="{dim}"/>"#));
    }

    if !sheet.col_widths.is_empty() {
        xml.push_str("<cols>");
        for (min, max, width) in &sheet.col_widths {
            xml.push_str(&format!(
                r#"<col min="{min}" max="{max}" width="{width}" customWidth="1"/>"#
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");

    let mut rows: std::collections::BTreeMap<u32, Vec<&CellEntry>> =
        std::collections::BTreeMap::new();
    for cell in &sheet.cells {
        rows.entry(row_of(&cell.cell_ref)).or_default().push(cell);
    }
    for (row, _) in &sheet.row_heights {
        rows.entry(*row).or_default();
    }

    for (row_num, cells) in rows {
        let height = sheet
            .row_heights
            .iter()
            .find(|(r, _)| *r == row_num)
            .map(|(_, h)| format!(r#" ht="{h}" customHeight="1""#))
            .unwrap_or_default();
        xml.push_str(&format!(r#"<row r="{row_num}"{height}>"#));

        for cell in cells {
            xml.push_str(&format!(r#"<c r="{}""#, cell.cell_ref));
            if let Some(s) = cell.style.as_ref().and_then(|s| styles.style_index(s)) {
                xml.push_str(&format!(r#" s="{s}""#));
            }
            let type_attr = match &cell.value {
                CellValue::String(_) => Some("s"),
                CellValue::Boolean(_) => Some("b"),
                CellValue::Error(_) => Some("e"),
                CellValue::InlineString(_) => Some("inlineStr"),
                CellValue::FormulaString(_) => Some("str"),
                CellValue::Number(_) | CellValue::Empty => None,
            };
            if let Some(t) = type_attr {
                xml.push_str(&format!(r#" t="{t}""#));
            }

            if cell.value == CellValue::Empty && cell.formula.is_none() {
                xml.push_str("/>");
                continue;
            }
            xml.push('>');

            match &cell.formula {
                Some(FormulaDef::Normal(text)) => {
                    xml.push_str(&format!("<f>{}</f>", escape_xml(text)));
                }
                Some(FormulaDef::SharedMaster { text, si, range }) => {
                    xml.push_str(&format!(
                        r#"<f t="shared" ref="{range}" si="{si}">{}</f>"#,
                        escape_xml(text)
                    ));
                }
                Some(FormulaDef::SharedFollower { si }) => {
                    xml.push_str(&format!(r#"<f t="shared" si="{si}"/>"#));
                }
                None => {}
            }

            match &cell.value {
                CellValue::String(s) => {
                    let idx = shared_strings.iter().position(|x| x == s).unwrap_or(0);
                    xml.push_str(&format!("<v>{idx}</v>"));
                }
                CellValue::Number(n) => xml.push_str(&format!("<v>{n}</v>")),
                CellValue::Boolean(b) => xml.push_str(&format!("<v>{}</v>", u8::from(*b))),
                CellValue::Error(e) | CellValue::FormulaString(e) => {
                    xml.push_str(&format!("<v>{}</v>", escape_xml(e)));
                }
                CellValue::InlineString(s) => {
                    xml.push_str(&format!("<is><t>{}</t></is>", escape_xml(s)));
                }
                CellValue::Empty => {}
            }
            xml.push_str("</c>");
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for merge in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{merge}"/>"#));
        }
        xml.push_str("</mergeCells>");
    }

    xml.push_str("</worksheet>");
    xml
}

// Helper functions

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn row_of(cell_ref: &str) -> u32 {
    let digits: String = cell_ref.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(1)
}
