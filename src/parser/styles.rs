//! Parsing of xl/styles.xml and resolution of cell formats to colors.
//!
//! Only the parts that feed cell colors are read: fonts (text color), fills
//! (background), cellXfs (which font and fill a cell uses) and the custom
//! indexed palette.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

use crate::color::resolve_color;
use crate::error::Result;
use crate::types::{CellXf, RawFill, RawFont, Rgba, StyleSheet, Theme};
use crate::xml_helpers::{attr_string, attr_u32, attr_val, parse_color_attrs};

/// Parse styles.xml content
pub fn parse_styles<R: BufRead>(reader: R) -> Result<StyleSheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut stylesheet = StyleSheet::default();
    let mut buf = Vec::new();

    let mut in_fonts = false;
    let mut in_fills = false;
    let mut in_cell_xfs = false;
    let mut in_indexed_colors = false;

    let mut current_font: Option<RawFont> = None;
    let mut current_fill: Option<RawFill> = None;
    let mut current_xf: Option<CellXf> = None;
    let mut indexed_colors: Vec<String> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(ref e) | Event::Empty(ref e))) => {
                let is_empty = matches!(event, Event::Empty(_));

                match e.local_name().as_ref() {
                    b"fonts" => in_fonts = !is_empty,
                    b"fills" => in_fills = !is_empty,
                    b"cellXfs" => in_cell_xfs = !is_empty,
                    b"indexedColors" => in_indexed_colors = !is_empty,

                    b"rgbColor" if in_indexed_colors => {
                        if let Some(rgb) = attr_string(e, b"rgb") {
                            indexed_colors.push(rgb);
                        }
                    }

                    b"font" if in_fonts => {
                        if is_empty {
                            stylesheet.fonts.push(RawFont::default());
                        } else {
                            current_font = Some(RawFont::default());
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            font.name = attr_val(e);
                        }
                    }
                    b"color" => {
                        if let Some(font) = current_font.as_mut() {
                            font.color = Some(parse_color_attrs(e));
                        }
                    }

                    b"fill" if in_fills => {
                        if is_empty {
                            stylesheet.fills.push(RawFill::default());
                        } else {
                            current_fill = Some(RawFill::default());
                        }
                    }
                    b"patternFill" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.pattern_type = attr_string(e, b"patternType");
                        }
                    }
                    b"fgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.fg_color = Some(parse_color_attrs(e));
                        }
                    }
                    b"bgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.bg_color = Some(parse_color_attrs(e));
                        }
                    }

                    b"xf" if in_cell_xfs => {
                        let xf = CellXf {
                            font_id: attr_u32(e, b"fontId"),
                            fill_id: attr_u32(e, b"fillId"),
                        };
                        if is_empty {
                            stylesheet.cell_xfs.push(xf);
                        } else {
                            current_xf = Some(xf);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"fonts" => in_fonts = false,
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                b"indexedColors" => in_indexed_colors = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        stylesheet.fonts.push(font);
                    }
                }
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        stylesheet.fills.push(fill);
                    }
                }
                b"xf" => {
                    if let Some(xf) = current_xf.take() {
                        stylesheet.cell_xfs.push(xf);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if !indexed_colors.is_empty() {
        stylesheet.indexed_colors = Some(indexed_colors);
    }

    Ok(stylesheet)
}

/// Fill and text color of one cell format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CellColors {
    pub fill: Option<Rgba>,
    pub text: Option<Rgba>,
}

/// Resolve every cellXfs entry to concrete colors, indexed like `cell_xfs`.
///
/// Unset colors stay `None` so the map's configured defaults apply.
pub(crate) fn resolve_cell_colors(stylesheet: &StyleSheet, theme: &Theme) -> Vec<CellColors> {
    let indexed = stylesheet.indexed_colors.as_ref();
    stylesheet
        .cell_xfs
        .iter()
        .map(|xf| {
            let fill = xf
                .fill_id
                .and_then(|id| stylesheet.fills.get(id as usize))
                .and_then(|fill| fill_color(fill, &theme.colors, indexed));
            // An automatic font color is the window text color
            let text = xf
                .font_id
                .and_then(|id| stylesheet.fonts.get(id as usize))
                .and_then(|font| font.color.as_ref())
                .and_then(|c| resolve_color(c, &theme.colors, indexed, Some(Rgba::BLACK)));
            CellColors { fill, text }
        })
        .collect()
}

/// Background of a pattern fill. Solid fills paint the foreground color;
/// for other patterns the foreground is the dominant color too, falling
/// back to the background color.
fn fill_color(
    fill: &RawFill,
    theme_colors: &[String],
    indexed: Option<&Vec<String>>,
) -> Option<Rgba> {
    match fill.pattern_type.as_deref() {
        None | Some("none") => None,
        Some(_) => fill
            .fg_color
            .as_ref()
            .and_then(|c| resolve_color(c, theme_colors, indexed, None))
            .or_else(|| {
                fill.bg_color
                    .as_ref()
                    .and_then(|c| resolve_color(c, theme_colors, indexed, None))
            }),
    }
}
