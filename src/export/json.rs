use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::types::MapDocument;

const INDENT: &[u8] = b"    ";

/// Serialize `document` as indented JSON into `writer`.
pub fn to_json_writer<W: Write>(document: &MapDocument, writer: W) -> Result<()> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut ser)?;
    Ok(())
}

/// Serialize `document` as an indented JSON string.
pub fn to_json_string(document: &MapDocument) -> Result<String> {
    let mut buf = Vec::new();
    to_json_writer(document, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::error::MapError::Internal(e.to_string()))
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
    use crate::types::{CellRecord, GridLine, LineAxis, Rgba, SheetMap};
    use serde_json::Value;

    fn document() -> MapDocument {
        let cell = CellRecord {
            name: "Sheet0!A1".to_string(),
            coord: (0.0, 0.0),
            height: 15.0,
            width: 63.225,
            value: "5".to_string(),
            bg_color: Rgba::WHITE,
            text_color: Rgba::BLACK,
            formula: None,
            formula_type: None,
            uses: vec![],
            used_by: vec!["Sheet0!B1".to_string()],
            weight: 0,
            rank: 0,
        };
        let sheet = SheetMap {
            rows: vec![
                GridLine::new(LineAxis::Row, (0.0, 0.0), (0.0, 0.0)),
                GridLine::new(LineAxis::Row, (0.0, -15.0), (0.0, -15.0)),
            ],
            cols: vec![GridLine::new(LineAxis::Column, (0.0, 0.0), (0.0, -15.0))],
            cells: vec![cell],
            total_width: 0.0,
            total_height: -15.0,
        };
        MapDocument {
            sheets: vec![("sheet0".to_string(), sheet.clone()), ("sheet1".to_string(), sheet)],
            diagnostics: vec![],
        }
    }

    #[test]
    fn test_document_shape() {
        let json: Value = serde_json::from_str(&to_json_string(&document()).unwrap()).unwrap();
        let sheets = json.as_array().unwrap();
        assert_eq!(sheets.len(), 2);

        let sheet0 = &sheets[0]["sheet0"];
        assert_eq!(sheet0["rows"][1]["path"][0][1], -15.0);
        assert_eq!(sheet0["total_height"], -15.0);
        assert!(sheets[1].get("sheet1").is_some());

        let cell = &sheet0["cells"][0];
        assert_eq!(cell["name"], "Sheet0!A1");
        assert_eq!(cell["bg_color"], serde_json::json!([255, 255, 255, 255]));
        assert_eq!(cell["coord"], serde_json::json!([0.0, 0.0]));
        assert!(cell["formula"].is_null());
        assert!(cell["formula_type"].is_null());
        assert_eq!(cell["used_by"][0], "Sheet0!B1");
        // Line axis is internal only
        assert!(sheet0["rows"][0].get("axis").is_none());
    }

    #[test]
    fn test_four_space_indent() {
        let text = to_json_string(&document()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"sheet0\": {"));
    }

    #[test]
    fn test_line_counts_survive_reparse() {
        let json: Value = serde_json::from_str(&to_json_string(&document()).unwrap()).unwrap();
        let sheet0 = &json[0]["sheet0"];
        assert_eq!(sheet0["rows"].as_array().unwrap().len(), 2);
        assert_eq!(sheet0["cols"].as_array().unwrap().len(), 1);
    }
}
