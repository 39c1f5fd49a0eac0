use serde::{Deserialize, Serialize};
use std::fmt;

use super::Rgba;

/// Cell with position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub r: u32, // row (0-indexed)
    pub c: u32, // col (0-indexed)
    pub cell: Cell,
}

/// A literal value, or the cached result of a formula
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "camelCase")]
pub enum CellValue {
    #[default]
    Blank,
    Text(String),
    Number(f64),
    Bool(bool),
    Error(String),
}

impl CellValue {
    /// Blank cells and empty strings count as unused
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => Ok(()),
            Self::Text(s) | Self::Error(s) => f.write_str(s),
            // f64 Display already prints 10.0 as "10"
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
        }
    }
}

/// What a cell holds: a plain value or a formula with its cached result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellContent {
    Literal(CellValue),
    Formula {
        /// Expression text including the leading `=`
        text: String,
        /// Last computed value as stored by the spreadsheet application
        cached: CellValue,
    },
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Literal(CellValue::Blank)
    }
}

/// A single cell's content and resolved colors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub content: CellContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Rgba>,
}

impl Cell {
    pub fn literal(value: CellValue) -> Self {
        Self {
            content: CellContent::Literal(value),
            ..Self::default()
        }
    }

    pub fn number(n: f64) -> Self {
        Self::literal(CellValue::Number(n))
    }

    pub fn text(s: &str) -> Self {
        Self::literal(CellValue::Text(s.to_string()))
    }

    /// Formula cell; a missing leading `=` is added
    pub fn formula(text: &str, cached: CellValue) -> Self {
        let text = if text.starts_with('=') {
            text.to_string()
        } else {
            format!("={text}")
        };
        Self {
            content: CellContent::Formula { text, cached },
            ..Self::default()
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula { text, .. } => Some(text),
            CellContent::Literal(_) => None,
        }
    }

    /// Value shown to the user: the literal, or the formula's cached result
    pub fn display_value(&self) -> &CellValue {
        match &self.content {
            CellContent::Literal(v) => v,
            CellContent::Formula { cached, .. } => cached,
        }
    }

    /// Formulas are never blank, even when their cached value is
    pub fn is_blank(&self) -> bool {
        match &self.content {
            CellContent::Literal(v) => v.is_blank(),
            CellContent::Formula { .. } => false,
        }
    }
}
