//! Inline HTML rendering of annotated spans.
//!
//! The renderer splices annotation markers into the literal text without
//! altering any character outside them. Trailing whitespace of an annotated
//! span is moved outside its marker so the highlight never covers spaces.
//!
//! Overlapping spans are resolved by position: annotations are visited in
//! ascending start order and any annotation starting before the end of the
//! previously emitted one is left out of the overlay.

use serde::{Deserialize, Deserializer, Serialize};

use crate::labels::{is_hex_color, DEFAULT_LABEL_COLOR};
use crate::span::char_boundaries;
use crate::types::DbId;

/// Characters stripped from the end of an annotated span: ASCII whitespace,
/// NBSP, the U+2000..U+200A spaces, narrow NBSP, medium math space, and the
/// ideographic space.
pub const TRAILING_SPACE_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '\u{0B}', '\u{0C}', '\u{A0}', '\u{2000}', '\u{2001}', '\u{2002}',
    '\u{2003}', '\u{2004}', '\u{2005}', '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}',
    '\u{200A}', '\u{202F}', '\u{205F}', '\u{3000}',
];

/// One annotation as handed to the renderer and to annotating clients.
///
/// Missing or `null` fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_index: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_index: i64,
    #[serde(default = "unknown_label", deserialize_with = "label_or_unknown")]
    pub label: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub label_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotated_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub username: Option<String>,
}

fn unknown_label() -> String {
    "Unknown".to_string()
}

fn default_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn label_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_label))
}

fn color_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_color))
}

/// Render from a JSON array of [`SpanAnnotation`]s.
///
/// Absent, empty, or malformed JSON renders the text with no annotations.
/// Elements are read one at a time, so a single unreadable element drops
/// only itself.
pub fn render_json(text: &str, annotations_json: Option<&str>) -> String {
    let parsed: Vec<SpanAnnotation> = annotations_json
        .filter(|json| !json.trim().is_empty())
        .and_then(|json| serde_json::from_str::<Vec<serde_json::Value>>(json).ok())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    render(text, &parsed)
}

/// Render `text` as HTML with `annotations` overlaid.
///
/// Literal text and all annotation metadata are HTML-escaped. Annotations
/// with an invalid or empty span, or that overlap an earlier one, emit
/// nothing; the text they cover flows through untouched.
pub fn render(text: &str, annotations: &[SpanAnnotation]) -> String {
    let boundaries = char_boundaries(text);
    let length = (boundaries.len() - 1) as i64;

    let mut ordered: Vec<&SpanAnnotation> = annotations.iter().collect();
    ordered.sort_by_key(|a| a.start_index);

    let mut out = String::with_capacity(text.len() * 2);
    let mut last_end: i64 = 0;

    for ann in ordered {
        let (start, end) = (ann.start_index, ann.end_index);
        if start < 0 || end > length || start >= end || start < last_end {
            continue;
        }

        push_escaped(&mut out, char_slice(text, &boundaries, last_end, start));

        let covered = char_slice(text, &boundaries, start, end);
        let core = covered.trim_end_matches(TRAILING_SPACE_CHARS);
        let trailing = &covered[core.len()..];

        if !core.is_empty() {
            push_marker(&mut out, core, ann);
        }
        push_escaped(&mut out, trailing);

        last_end = end;
    }

    push_escaped(&mut out, &text[boundaries[last_end as usize]..]);
    out
}

fn char_slice<'a>(text: &'a str, boundaries: &[usize], from: i64, to: i64) -> &'a str {
    &text[boundaries[from as usize]..boundaries[to as usize]]
}

fn push_marker(out: &mut String, core: &str, ann: &SpanAnnotation) {
    let color = if is_hex_color(&ann.label_color) {
        ann.label_color.as_str()
    } else {
        DEFAULT_LABEL_COLOR
    };

    out.push_str(&format!(
        "<span class=\"annotation-span\" style=\"border-bottom-color: {color}; background-color: {color};\" data-ann-id=\"{}\">",
        ann.id
    ));
    push_escaped(out, core);
    out.push_str("<div class=\"annotation-info\"><strong>");
    push_escaped(out, &ann.label);
    out.push_str("</strong>");

    if !ann.suggestions.is_empty() {
        out.push_str("<br><strong>Suggestions:</strong><br>");
        for (i, suggestion) in ann.suggestions.iter().enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            out.push_str("\u{2022} ");
            push_escaped(out, suggestion);
        }
    }

    out.push_str("</div></span>");
}

/// Append `raw` with the five HTML-significant characters escaped.
fn push_escaped(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}
