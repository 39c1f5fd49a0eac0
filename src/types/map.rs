use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use super::Rgba;
use crate::error::Diagnostic;

/// A point in tile coordinate space; y decreases downward
pub type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Row,
    Column,
}

/// A gridline segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub path: [Point; 2],
    #[serde(skip, default = "default_axis")]
    pub axis: LineAxis,
}

fn default_axis() -> LineAxis {
    LineAxis::Row
}

impl GridLine {
    pub fn new(axis: LineAxis, from: Point, to: Point) -> Self {
        Self {
            path: [from, to],
            axis,
        }
    }
}

/// One cell as emitted in the map document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Sheet-qualified name, e.g. `Sheet0!B1`
    pub name: String,
    /// Top-left corner
    pub coord: Point,
    pub height: f64,
    pub width: f64,
    /// Display text, clipped to the cell width
    pub value: String,
    pub bg_color: Rgba,
    pub text_color: Rgba,
    pub formula: Option<String>,
    /// Signature id shared by structurally identical formulas
    pub formula_type: Option<u32>,
    pub uses: Vec<String>,
    pub used_by: Vec<String>,
    pub weight: u64,
    pub rank: u64,
}

/// Everything the renderer needs for one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMap {
    pub rows: Vec<GridLine>,
    pub cols: Vec<GridLine>,
    pub cells: Vec<CellRecord>,
    pub total_width: f64,
    pub total_height: f64,
}

/// The map of a whole workbook, one labelled entry per sheet in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapDocument {
    pub sheets: Vec<(String, SheetMap)>,
    /// Findings that did not abort the build (not part of the serialized form)
    pub diagnostics: Vec<Diagnostic>,
}

impl MapDocument {
    pub fn sheet(&self, label: &str) -> Option<&SheetMap> {
        self.sheets
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, map)| map)
    }
}

/// Serializes as `[{"sheet0": {...}}, {"sheet1": {...}}]`
impl Serialize for MapDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Entry<'a>(&'a str, &'a SheetMap);

        impl Serialize for Entry<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.0, self.1)?;
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.sheets.len()))?;
        for (label, sheet) in &self.sheets {
            seq.serialize_element(&Entry(label, sheet))?;
        }
        seq.end()
    }
}
