use serde::{Deserialize, Serialize};

/// An RGBA color, serialized as `[r, g, b, a]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

// ============================================================================
// Internal types for parsing (not serialized to JSON)
// ============================================================================

/// A color reference as written in styles.xml, before theme/palette lookup
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColorSpec {
    pub rgb: Option<String>,
    pub theme: Option<u32>,
    pub tint: Option<f64>,
    pub indexed: Option<u32>,
    pub auto: bool,
}

#[derive(Debug, Default, Clone)]
pub struct RawFont {
    pub name: Option<String>,
    pub color: Option<ColorSpec>,
}

#[derive(Debug, Default, Clone)]
pub struct RawFill {
    pub fg_color: Option<ColorSpec>,
    pub bg_color: Option<ColorSpec>,
    pub pattern_type: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct CellXf {
    pub font_id: Option<u32>,
    pub fill_id: Option<u32>,
}

/// Theme colors and fonts extracted from theme1.xml
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Theme {
    /// 12 theme colors: lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink
    pub colors: Vec<String>,
    /// Minor font (body) from fontScheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_font: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct StyleSheet {
    pub fonts: Vec<RawFont>,
    pub fills: Vec<RawFill>,
    pub cell_xfs: Vec<CellXf>,
    /// Custom indexed colors from `<colors><indexedColors>` (if present)
    /// Falls back to INDEXED_COLORS if None
    pub indexed_colors: Option<Vec<String>>,
}
