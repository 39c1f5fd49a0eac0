//! sheetmap - spreadsheet layout and dependency maps
//!
//! Reads an XLSX workbook and turns it into a map document for a canvas
//! renderer:
//! - every sheet trimmed to its content and tiled on one plane
//! - row and column gridlines per sheet tile
//! - one box per cell with its value, colors and formula
//! - per-cell formula dependencies (`uses` / `used_by`), weight and rank
//! - a structural signature id grouping formulas that differ only in operands
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use sheetmap::{export, map_xlsx, MapConfig};
//!
//! # fn main() -> sheetmap::Result<()> {
//! let bytes = std::fs::read("book.xlsx")?;
//! let document = map_xlsx(&bytes, &MapConfig::default())?;
//! export::write_document(&document, std::path::Path::new("map.json"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { build_map_json } from 'sheetmap';
//! await init();
//! const map = JSON.parse(build_map_json(new Uint8Array(buffer)));
//! ```

pub mod cell_ref;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod formula;
pub mod graph;
pub mod layout;
pub mod map;
pub mod parser;
pub mod types;
pub mod xml_helpers;

use wasm_bindgen::prelude::*;

pub use config::MapConfig;
pub use error::{Diagnostic, MapError, Result, UnsupportedReason};
pub use formula::SignatureTable;
pub use map::build_map;
pub use types::*;

/// Read an XLSX file and build its map with a fresh signature table.
///
/// # Errors
/// Fails if the file is not a readable workbook or a sheet has a
/// dependency cycle.
pub fn map_xlsx(data: &[u8], config: &MapConfig) -> Result<MapDocument> {
    let mut workbook = parser::parse(data)?;
    build_map(&mut workbook, config, &SignatureTable::new())
}

/// Build the map of an XLSX file and return it as indented JSON
///
/// # Errors
/// Returns an error if the file cannot be read or a sheet has a
/// dependency cycle.
#[wasm_bindgen]
pub fn build_map_json(data: &[u8]) -> std::result::Result<String, JsValue> {
    console_error_panic_hook::set_once();
    let document =
        map_xlsx(data, &MapConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    export::to_json_string(&document).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Build the map of an XLSX file as a `JsValue`, configured from TOML text
///
/// This skips the JSON round trip when the result is used directly in
/// JavaScript. An empty `config_toml` uses the defaults.
///
/// # Errors
/// Returns an error if the configuration or the file is invalid.
#[wasm_bindgen]
pub fn build_map_js(data: &[u8], config_toml: &str) -> std::result::Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let config =
        MapConfig::from_toml_str(config_toml).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let document = map_xlsx(data, &config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&document)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
