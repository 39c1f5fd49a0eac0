//! Color resolution utilities
//!
//! Turns the color references found in styles.xml (ARGB, theme + tint,
//! legacy indexed palette) into concrete [`Rgba`] values. Fully transparent
//! colors (`00000000`) are treated as "not set" so callers fall back to their
//! defaults.

use crate::types::{ColorSpec, Rgba};

/// Excel's 64 indexed colors (legacy palette)
pub const INDEXED_COLORS: [&str; 64] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0", "#808080",
    "#9999FF", "#993366", "#FFFFCC", "#CCFFFF", "#660066", "#FF8080", "#0066CC", "#CCCCFF",
    "#000080", "#FF00FF", "#FFFF00", "#00FFFF", "#800080", "#800000", "#008080", "#0000FF",
    "#00CCFF", "#CCFFFF", "#CCFFCC", "#FFFF99", "#99CCFF", "#FF99CC", "#CC99FF", "#FFCC99",
    "#3366FF", "#33CCCC", "#99CC00", "#FFCC00", "#FF9900", "#FF6600", "#666699", "#969696",
    "#003366", "#339966", "#003300", "#333300", "#993300", "#993366", "#333399", "#333333",
];

/// Default theme colors (Office theme) used when no theme is present
/// 0: lt1, 1: dk1, 2: lt2, 3: dk2, 4-9: accent1-6, 10: hlink, 11: folHlink
pub const DEFAULT_THEME_COLORS: [&str; 12] = [
    "#FFFFFF", "#000000", "#E7E6E6", "#44546A", "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000",
    "#5B9BD5", "#70AD47", "#0563C1", "#954F72",
];

/// Parse `RRGGBB` or `AARRGGBB` (with or without `#`).
///
/// Returns `None` for malformed input and for fully transparent `00000000`.
pub fn parse_hex_rgba(hex: &str) -> Option<Rgba> {
    let hex = hex.trim().trim_start_matches('#');
    let byte = |s: Option<&str>| s.and_then(|s| u8::from_str_radix(s, 16).ok());
    let color = match hex.len() {
        6 => Rgba::new(
            byte(hex.get(0..2))?,
            byte(hex.get(2..4))?,
            byte(hex.get(4..6))?,
            255,
        ),
        8 => Rgba::new(
            byte(hex.get(2..4))?,
            byte(hex.get(4..6))?,
            byte(hex.get(6..8))?,
            byte(hex.get(0..2))?,
        ),
        _ => return None,
    };
    if color == Rgba::new(0, 0, 0, 0) {
        return None;
    }
    Some(color)
}

/// Resolve a `ColorSpec` to a concrete color.
///
/// Priority: rgb > theme (with tint) > indexed > auto. Auto resolves to
/// `auto_color`, which differs between fills and fonts.
pub fn resolve_color(
    color: &ColorSpec,
    theme_colors: &[String],
    indexed_colors: Option<&Vec<String>>,
    auto_color: Option<Rgba>,
) -> Option<Rgba> {
    if let Some(rgb) = &color.rgb {
        return parse_hex_rgba(rgb);
    }

    if let Some(theme_idx) = color.theme {
        let idx = theme_idx as usize;
        let base = theme_colors
            .get(idx)
            .map(String::as_str)
            .or_else(|| DEFAULT_THEME_COLORS.get(idx).copied())
            .and_then(parse_hex_rgba)?;
        return Some(match color.tint {
            Some(tint) => apply_tint(base, tint),
            None => base,
        });
    }

    if let Some(indexed) = color.indexed {
        // 64 is "system foreground", 65 "system background"
        match indexed {
            64 => return Some(Rgba::BLACK),
            65 => return Some(Rgba::WHITE),
            _ => {}
        }
        let idx = indexed as usize;
        let custom = indexed_colors.and_then(|palette| palette.get(idx));
        let hex = custom
            .map(String::as_str)
            .or_else(|| INDEXED_COLORS.get(idx).copied())?;
        return parse_hex_rgba(hex);
    }

    if color.auto {
        return auto_color;
    }

    None
}

/// Apply a tint value to a color, keeping its alpha.
/// tint < 0: shade (darken)
/// tint > 0: tint (lighten)
#[allow(clippy::many_single_char_names)]
pub fn apply_tint(color: Rgba, tint: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color.r, color.g, color.b);

    let new_l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        (1.0 - l).mul_add(tint, l)
    };

    let (r, g, b) = hsl_to_rgb(h, s, new_l.clamp(0.0, 1.0));
    Rgba::new(r, g, b, color.a)
}

#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;

    if d.abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[allow(clippy::many_single_char_names)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = unit_to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l.mul_add(-s, l + s)
    };
    let p = 2.0f64.mul_add(l, -q);

    (
        unit_to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        unit_to_byte(hue_to_rgb(p, q, h)),
        unit_to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

/// Map 0.0..=1.0 to 0..=255; the clamp keeps the cast in range
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        return ((q - p) * 6.0).mul_add(t, p);
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p);
    }
    p
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn theme() -> Vec<String> {
        DEFAULT_THEME_COLORS.iter().map(ToString::to_string).collect()
    }

    fn rgb(s: &str) -> ColorSpec {
        ColorSpec {
            rgb: Some(s.to_string()),
            ..ColorSpec::default()
        }
    }

    #[test]
    fn test_parse_hex_argb_keeps_alpha() {
        assert_eq!(parse_hex_rgba("80FF0000"), Some(Rgba::new(255, 0, 0, 128)));
        assert_eq!(parse_hex_rgba("#00FF00"), Some(Rgba::new(0, 255, 0, 255)));
    }

    #[test]
    fn test_parse_hex_transparent_is_unset() {
        assert_eq!(parse_hex_rgba("00000000"), None);
    }

    #[test]
    fn test_parse_hex_malformed() {
        assert_eq!(parse_hex_rgba("FFF"), None);
        assert_eq!(parse_hex_rgba("GG0000"), None);
    }

    #[test]
    fn test_tint_lighten() {
        assert_eq!(apply_tint(Rgba::BLACK, 0.5), Rgba::new(128, 128, 128, 255));
    }

    #[test]
    fn test_tint_darken() {
        assert_eq!(apply_tint(Rgba::WHITE, -0.5), Rgba::new(128, 128, 128, 255));
    }

    #[test]
    fn test_resolve_rgb_over_theme() {
        let spec = ColorSpec {
            rgb: Some("FFFF0000".to_string()),
            theme: Some(4),
            ..ColorSpec::default()
        };
        assert_eq!(
            resolve_color(&spec, &theme(), None, None),
            Some(Rgba::new(255, 0, 0, 255))
        );
        assert_eq!(
            resolve_color(&rgb("FFFFFF00"), &theme(), None, None),
            Some(Rgba::new(255, 255, 0, 255))
        );
    }

    #[test]
    fn test_resolve_theme_accent1() {
        let spec = ColorSpec {
            theme: Some(4),
            ..ColorSpec::default()
        };
        assert_eq!(
            resolve_color(&spec, &theme(), None, None),
            Some(Rgba::new(0x44, 0x72, 0xC4, 255))
        );
    }

    #[test]
    fn test_resolve_theme_out_of_range_uses_nothing() {
        let spec = ColorSpec {
            theme: Some(40),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&spec, &theme(), None, None), None);
    }

    #[test]
    fn test_resolve_empty_theme_uses_defaults() {
        let spec = ColorSpec {
            theme: Some(1),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&spec, &[], None, None), Some(Rgba::BLACK));
    }

    #[test]
    fn test_resolve_indexed() {
        let spec = ColorSpec {
            indexed: Some(2),
            ..ColorSpec::default()
        };
        assert_eq!(
            resolve_color(&spec, &theme(), None, None),
            Some(Rgba::new(255, 0, 0, 255))
        );

        let custom = vec!["#123456".to_string(), "#654321".to_string(), "#ABCDEF".to_string()];
        assert_eq!(
            resolve_color(&spec, &theme(), Some(&custom), None),
            Some(Rgba::new(0xAB, 0xCD, 0xEF, 255))
        );
    }

    #[test]
    fn test_resolve_system_indexed() {
        let fg = ColorSpec {
            indexed: Some(64),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&fg, &theme(), None, None), Some(Rgba::BLACK));
        let bg = ColorSpec {
            indexed: Some(65),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&bg, &theme(), None, None), Some(Rgba::WHITE));
    }

    #[test]
    fn test_resolve_auto_uses_caller_default() {
        let spec = ColorSpec {
            auto: true,
            ..ColorSpec::default()
        };
        assert_eq!(
            resolve_color(&spec, &theme(), None, Some(Rgba::BLACK)),
            Some(Rgba::BLACK)
        );
        assert_eq!(resolve_color(&spec, &theme(), None, None), None);
    }

    #[test]
    fn test_resolve_empty_spec() {
        assert_eq!(
            resolve_color(&ColorSpec::default(), &theme(), None, None),
            None
        );
    }
}
