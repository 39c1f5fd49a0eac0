//! Shared XML attribute parsing utilities for the XLSX reader.
//!
//! All functions handle UTF-8 conversion safely and return `None` for
//! missing or malformed attributes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

use crate::types::ColorSpec;

/// Extract a string attribute value by key, with XML entities unescaped.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract a string attribute by local name (ignoring namespace prefix).
///
/// Used for `r:id`, whose prefix varies between producers.
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.parse().ok())
}

/// Extract an `f64` attribute value by key.
pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean attribute value by key.
///
/// Returns `None` if missing. Recognizes `"1"`, `"true"` as true.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// Extract the `val` attribute as a string. Very common in XLSX XML.
pub fn attr_val(e: &BytesStart) -> Option<String> {
    attr_string(e, b"val")
}

/// Parse color attributes from an XML element into a `ColorSpec`.
///
/// Handles `rgb`, `theme`, `tint`, `indexed`, and `auto` attributes.
pub fn parse_color_attrs(e: &BytesStart) -> ColorSpec {
    ColorSpec {
        rgb: attr_string(e, b"rgb"),
        theme: attr_u32(e, b"theme"),
        tint: attr_f64(e, b"tint"),
        indexed: attr_u32(e, b"indexed"),
        auto: attr_bool(e, b"auto").unwrap_or(false),
    }
}

/// Collect the text content of the element just opened, up to its matching
/// end tag. Nested markup is skipped; its text is kept.
pub fn read_text<R: BufRead>(xml: &mut Reader<R>, end: &[u8]) -> String {
    let mut text = String::new();
    let mut buf = Vec::new();
    let mut depth = 0u32;
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Text(ref t)) => {
                if let Ok(s) = t.unescape() {
                    text.push_str(&s);
                }
            }
            Ok(Event::CData(ref t)) => {
                text.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == end => depth += 1,
            Ok(Event::End(ref e)) if e.local_name().as_ref() == end => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    text
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

    fn make_start(xml: &str) -> BytesStart<'_> {
        // Strip < and > / /> to get just the tag content
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<foo name="hello" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("hello".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);

        let e = make_start(r#"<sheet name="Q1 &amp; Q2" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("Q1 & Q2".to_string()));
    }

    #[test]
    fn test_attr_string_local_ignores_prefix() {
        let e = make_start(r#"<sheet name="Data" r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id"), Some("rId3".to_string()));
        assert_eq!(attr_string(&e, b"id"), None);
    }

    #[test]
    fn test_numeric_attrs() {
        let e = make_start(r#"<row r="42" ht="20.25" bad="x" />"#);
        assert_eq!(attr_u32(&e, b"r"), Some(42));
        assert_eq!(attr_f64(&e, b"ht"), Some(20.25));
        assert_eq!(attr_u32(&e, b"bad"), None);
    }

    #[test]
    fn test_attr_bool() {
        let e = make_start(r#"<foo a="1" b="0" c="true" />"#);
        assert_eq!(attr_bool(&e, b"a"), Some(true));
        assert_eq!(attr_bool(&e, b"b"), Some(false));
        assert_eq!(attr_bool(&e, b"c"), Some(true));
        assert_eq!(attr_bool(&e, b"missing"), None);
    }

    #[test]
    fn test_parse_color_attrs() {
        let e = make_start(r#"<color theme="4" tint="-0.25" />"#);
        let color = parse_color_attrs(&e);
        assert_eq!(color.rgb, None);
        assert_eq!(color.theme, Some(4));
        assert_eq!(color.tint, Some(-0.25));
        assert!(!color.auto);

        let e = make_start(r#"<color auto="1" />"#);
        assert!(parse_color_attrs(&e).auto);
    }

    #[test]
    fn test_read_text_unescapes_and_spans_runs() {
        let mut xml = Reader::from_str("<t>a &amp; b</t><is><r><t>x</t></r><r><t>y</t></r></is>");
        let mut buf = Vec::new();
        let _ = xml.read_event_into(&mut buf).unwrap();
        assert_eq!(read_text(&mut xml, b"t"), "a & b");

        buf.clear();
        let _ = xml.read_event_into(&mut buf).unwrap();
        assert_eq!(read_text(&mut xml, b"is"), "xy");
    }
}
