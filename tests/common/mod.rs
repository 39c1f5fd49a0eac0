//! Common test utilities for sheetmap integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use serde_json::Value;

use sheetmap::{export, map_xlsx, parser, CellRecord, MapConfig, MapDocument, Workbook};

/// Parse an XLSX file, panicking with the error on failure.
pub fn parse_workbook(data: &[u8]) -> Workbook {
    parser::parse(data).expect("Failed to parse XLSX")
}

/// Map an XLSX file with the default configuration.
pub fn map_default(data: &[u8]) -> MapDocument {
    map_xlsx(data, &MapConfig::default()).expect("Failed to map XLSX")
}

/// Map an XLSX file and re-read the serialized document.
pub fn map_json(data: &[u8]) -> Value {
    let document = map_default(data);
    let json = export::to_json_string(&document).expect("Failed to serialize");
    serde_json::from_str(&json).expect("Serialized map is not valid JSON")
}

/// Cell record `name` (e.g. `Sheet0!B1`) of sheet `label`.
pub fn find_cell<'a>(document: &'a MapDocument, label: &str, name: &str) -> &'a CellRecord {
    let sheet = document
        .sheet(label)
        .unwrap_or_else(|| panic!("no sheet {label}"));
    sheet
        .cells
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no cell {name} in {label}"))
}

/// The object of sheet `index` in a serialized document.
pub fn json_sheet(json: &Value, index: usize) -> &Value {
    let label = format!("sheet{index}");
    json[index]
        .get(&label)
        .unwrap_or_else(|| panic!("entry {index} is not {label}"))
}

/// Cell object `name` in a serialized sheet.
pub fn json_cell<'a>(sheet: &'a Value, name: &str) -> &'a Value {
    sheet["cells"]
        .as_array()
        .expect("cells is not an array")
        .iter()
        .find(|c| c["name"] == name)
        .unwrap_or_else(|| panic!("no cell {name}"))
}

/// Number of row and column gridlines of a serialized sheet.
pub fn line_counts(sheet: &Value) -> (usize, usize) {
    let rows = sheet["rows"].as_array().map_or(0, Vec::len);
    let cols = sheet["cols"].as_array().map_or(0, Vec::len);
    (rows, cols)
}

pub fn names(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}
