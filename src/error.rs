//! Structured error types for sheetmap.
//!
//! Fatal failures surface as [`MapError`]. Problems that only affect a single
//! cell (a formula that does not tokenize, a reference the engine cannot
//! follow) are collected as [`Diagnostic`]s and never abort a run.

use serde::Serialize;

/// All errors that can abort reading a workbook or building its map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// The `uses` graph of a sheet contains a cycle.
    #[error("Cyclic dependency in {sheet} closing at {cell}")]
    CyclicDependency { sheet: String, cell: String },

    /// Malformed workbook structure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file could not be decoded.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON serialization: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken internal invariant (a bug, not bad input).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(target_arch = "wasm32")]
impl From<MapError> for wasm_bindgen::JsValue {
    fn from(e: MapError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

/// Why a reference in a formula was left out of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedReason {
    /// `Sheet2!A1` style references; edges only connect cells of one sheet.
    CrossSheet,
    /// `A:A` or `1:1`; no bounded rectangle to expand.
    WholeRowOrColumn,
    /// Points past the trimmed used region of the sheet.
    OutsideSheet,
    /// Contains a digit but is not a cell coordinate.
    Unparsable,
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::CrossSheet => "cross-sheet reference",
            Self::WholeRowOrColumn => "whole row/column reference",
            Self::OutsideSheet => "outside the used sheet region",
            Self::Unparsable => "not a cell coordinate",
        };
        f.write_str(text)
    }
}

/// A non-fatal finding recorded while building a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The formula text could not be tokenized. The cell keeps its raw
    /// formula but carries no signature or dependency edges.
    #[error("{sheet}!{cell}: formula parse error: {message}")]
    FormulaParse {
        sheet: String,
        cell: String,
        message: String,
    },

    /// A reference was skipped when building dependency edges.
    #[error("{sheet}!{cell}: unsupported reference {reference} ({reason})")]
    UnsupportedReference {
        sheet: String,
        cell: String,
        reference: String,
        reason: UnsupportedReason,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_names_cell() {
        let err = MapError::CyclicDependency {
            sheet: "Sheet0".to_string(),
            cell: "B2".to_string(),
        };
        assert_eq!(err.to_string(), "Cyclic dependency in Sheet0 closing at B2");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::UnsupportedReference {
            sheet: "Sheet0".to_string(),
            cell: "C1".to_string(),
            reference: "Other!A1".to_string(),
            reason: UnsupportedReason::CrossSheet,
        };
        assert_eq!(
            diag.to_string(),
            "Sheet0!C1: unsupported reference Other!A1 (cross-sheet reference)"
        );
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let diag = Diagnostic::FormulaParse {
            sheet: "Sheet0".to_string(),
            cell: "A1".to_string(),
            message: "unterminated string".to_string(),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "formula_parse");
        assert_eq!(json["cell"], "A1");
    }
}
