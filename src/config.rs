//! Map build settings.
//!
//! Every field has a default matching the classic spreadsheet metrics the
//! visualization layer expects, so an empty TOML file (or no file at all)
//! yields a working configuration.
//!
//! ```toml
//! tile_gap = 80.0
//! output_path = "out/map.json"
//! default_text_color = [32, 32, 32, 255]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Rgba;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Default column width in characters
pub const DEFAULT_COL_WIDTH: f64 = 8.43;

/// Characters → points factor applied to column widths
pub const COL_WIDTH_SCALE: f64 = 7.5;

/// Spacing between tiles in the combined canvas
pub const TILE_GAP: f64 = 50.0;

/// Assumed width of one rendered character (Calibri 11pt)
pub const CHAR_WIDTH: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Height used for rows without an explicit height record
    pub default_row_height: f64,
    /// Width (characters) used for columns without an explicit width record
    pub default_col_width: f64,
    /// Multiplier from character widths to point widths
    pub col_width_scale: f64,
    /// Gap added between tiles on both axes
    pub tile_gap: f64,
    /// Fixed character width used when clipping display values
    pub char_width: f64,
    /// Fill color for cells without a resolvable fill
    pub default_fill: Rgba,
    /// Text color for cells without a resolvable font color
    pub default_text_color: Rgba,
    /// Where the CLI writes the map document
    pub output_path: PathBuf,
    /// Prefix of the per-sheet key in the document (`sheet0`, `sheet1`, ...)
    pub sheet_label_prefix: String,
    /// Prefix of sheet-qualified cell names (`Sheet0!A1`)
    pub sheet_name_prefix: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_col_width: DEFAULT_COL_WIDTH,
            col_width_scale: COL_WIDTH_SCALE,
            tile_gap: TILE_GAP,
            char_width: CHAR_WIDTH,
            default_fill: Rgba::WHITE,
            default_text_color: Rgba::BLACK,
            output_path: PathBuf::from("uploads/small_test.json"),
            sheet_label_prefix: "sheet".to_string(),
            sheet_name_prefix: "Sheet".to_string(),
        }
    }
}

impl MapConfig {
    /// Decode a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Column width in points for a width expressed in characters
    pub fn scaled_width(&self, chars: f64) -> f64 {
        chars * self.col_width_scale
    }

    /// Key of the sheet at `index` in the output document
    pub fn sheet_label(&self, index: usize) -> String {
        format!("{}{index}", self.sheet_label_prefix)
    }

    /// Sheet-qualified cell name, e.g. `Sheet0!B3`
    pub fn qualified_name(&self, index: usize, cell: &str) -> String {
        format!("{}{index}!{cell}", self.sheet_name_prefix)
    }
}
