//! Tests for fill and text color resolution from styles.xml.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{find_cell, map_default, parse_workbook};
use fixtures::{SheetBuilder, StyleBuilder, XlsxBuilder};
use sheetmap::{MapConfig, Rgba};
use test_case::test_case;

fn fill_of(style: StyleBuilder) -> Option<Rgba> {
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Colors").cell("A1", 1, Some(style)))
        .build();
    parse_workbook(&xlsx).sheets[0]
        .cell_at(0, 0)
        .and_then(|c| c.fill_color)
}

fn text_of(style: StyleBuilder) -> Option<Rgba> {
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Colors").cell("A1", 1, Some(style)))
        .build();
    parse_workbook(&xlsx).sheets[0]
        .cell_at(0, 0)
        .and_then(|c| c.text_color)
}

// ============================================================================
// Fills
// ============================================================================

#[test_case(StyleBuilder::new().bg_color("FFFF0000"), Some(Rgba::new(255, 0, 0, 255)) ; "argb")]
#[test_case(StyleBuilder::new().bg_color("80336699"), Some(Rgba::new(0x33, 0x66, 0x99, 0x80)) ; "alpha kept")]
#[test_case(StyleBuilder::new().bg_theme(4, None), Some(Rgba::new(0x44, 0x72, 0xC4, 255)) ; "theme accent1")]
#[test_case(StyleBuilder::new().bg_indexed(2), Some(Rgba::new(255, 0, 0, 255)) ; "indexed red")]
#[test_case(StyleBuilder::new().bg_indexed(64), Some(Rgba::BLACK) ; "system foreground")]
#[test_case(StyleBuilder::new().bg_color("00000000"), None ; "transparent is unset")]
#[test_case(StyleBuilder::new().bg_color("FFFF0000").pattern("none"), None ; "pattern none")]
#[test_case(StyleBuilder::new().font_color("FF00FF00"), None ; "font only")]
fn test_fill_color(style: StyleBuilder, expected: Option<Rgba>) {
    assert_eq!(fill_of(style), expected);
}

#[test]
fn test_theme_tint_lightens() {
    let base = fill_of(StyleBuilder::new().bg_theme(4, None)).expect("no base fill");
    let light = fill_of(StyleBuilder::new().bg_theme(4, Some(0.6))).expect("no tinted fill");
    assert!(light.r > base.r && light.g > base.g && light.b > base.b);

    let dark = fill_of(StyleBuilder::new().bg_theme(4, Some(-0.5))).expect("no shaded fill");
    assert!(dark.r < base.r && dark.b < base.b);
}

#[test]
fn test_non_solid_pattern_uses_foreground() {
    let fill = fill_of(StyleBuilder::new().bg_color("FF0000FF").pattern("gray125"));
    assert_eq!(fill, Some(Rgba::new(0, 0, 255, 255)));
}

#[test]
fn test_custom_indexed_palette() {
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Colors").cell("A1", 1, Some(StyleBuilder::new().bg_indexed(2))))
        .indexed_colors(vec![
            "FF111111".to_string(),
            "FF222222".to_string(),
            "FF333333".to_string(),
        ])
        .build();
    let fill = parse_workbook(&xlsx).sheets[0]
        .cell_at(0, 0)
        .and_then(|c| c.fill_color);
    assert_eq!(fill, Some(Rgba::new(0x33, 0x33, 0x33, 255)));
}

#[test]
fn test_custom_theme_colors() {
    let mut colors: Vec<String> = vec!["FFFFFF".to_string(); 12];
    colors[5] = "0A0B0C".to_string();
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Colors").cell("A1", 1, Some(StyleBuilder::new().bg_theme(5, None))))
        .theme_colors(colors)
        .build();
    let fill = parse_workbook(&xlsx).sheets[0]
        .cell_at(0, 0)
        .and_then(|c| c.fill_color);
    assert_eq!(fill, Some(Rgba::new(0x0A, 0x0B, 0x0C, 255)));
}

// ============================================================================
// Fonts
// ============================================================================

#[test_case(StyleBuilder::new().font_color("FF00B050"), Some(Rgba::new(0, 0xB0, 0x50, 255)) ; "argb")]
#[test_case(StyleBuilder::new().font_theme(4, None), Some(Rgba::new(0x44, 0x72, 0xC4, 255)) ; "theme")]
#[test_case(StyleBuilder::new().font_auto(), Some(Rgba::BLACK) ; "auto is black")]
#[test_case(StyleBuilder::new().bg_color("FFFF0000"), Some(Rgba::BLACK) ; "default font dk1")]
fn test_text_color(style: StyleBuilder, expected: Option<Rgba>) {
    assert_eq!(text_of(style), expected);
}

// ============================================================================
// Defaults in the map
// ============================================================================

#[test]
fn test_map_applies_defaults_and_resolved_colors() {
    let xlsx = XlsxBuilder::new()
        .sheet(
            SheetBuilder::new("Colors")
                .cell("A1", 1, None)
                .cell("B1", 2, Some(StyleBuilder::new().bg_color("FFFFFF00").font_color("FF0000FF")))
                .cell("C1", 3, Some(StyleBuilder::new().bg_color("00000000"))),
        )
        .build();

    let document = map_default(&xlsx);
    let config = MapConfig::default();

    let plain = find_cell(&document, "sheet0", "Sheet0!A1");
    assert_eq!(plain.bg_color, config.default_fill);
    assert_eq!(plain.text_color, Rgba::BLACK);

    let styled = find_cell(&document, "sheet0", "Sheet0!B1");
    assert_eq!(styled.bg_color, Rgba::new(255, 255, 0, 255));
    assert_eq!(styled.text_color, Rgba::new(0, 0, 255, 255));

    let transparent = find_cell(&document, "sheet0", "Sheet0!C1");
    assert_eq!(transparent.bg_color, Rgba::WHITE);
}

#[test]
fn test_blank_grid_cells_use_configured_defaults() {
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Sparse").cell("B2", 1, None))
        .build();
    let config = MapConfig::from_toml_str(
        "default_fill = [10, 20, 30, 255]\ndefault_text_color = [200, 0, 0, 255]\n",
    )
    .expect("bad config");

    let document = sheetmap::map_xlsx(&xlsx, &config).expect("map failed");
    let blank = find_cell(&document, "sheet0", "Sheet0!A1");
    assert_eq!(blank.bg_color, Rgba::new(10, 20, 30, 255));
    assert_eq!(blank.text_color, Rgba::new(200, 0, 0, 255));
}
