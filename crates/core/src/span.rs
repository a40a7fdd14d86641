//! Character-range spans over text content.
//!
//! All offsets are counted in Unicode scalar values (`char`s), never bytes,
//! so a span recorded against a Bangla sentence stays stable regardless of
//! how many UTF-8 bytes each character occupies.

/// Number of characters in `text`, as used for span bounds.
pub fn char_len(text: &str) -> i64 {
    text.chars().count() as i64
}

/// Returns `true` iff `[start, end)` is a non-empty range inside a text of
/// `length` characters.
///
/// Used both when an annotation is written and when stored annotations are
/// checked against content that may have been edited since.
pub fn is_valid_span(start: i64, end: i64, length: i64) -> bool {
    start >= 0 && end > start && end <= length
}

/// Byte offsets of every character boundary in `text`, including the final
/// `text.len()`. Index `i` holds the byte offset of character `i`.
pub fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// The substring covered by `[start, end)`, or `None` when the span is not
/// valid for this text.
pub fn slice_span(text: &str, start: i64, end: i64) -> Option<&str> {
    let boundaries = char_boundaries(text);
    let length = (boundaries.len() - 1) as i64;
    if !is_valid_span(start, end, length) {
        return None;
    }
    Some(&text[boundaries[start as usize]..boundaries[end as usize]])
}

/// The first `n` characters of `text`.
pub fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ranges_inside_the_text() {
        assert!(is_valid_span(0, 1, 1));
        assert!(is_valid_span(0, 11, 11));
        assert!(is_valid_span(3, 7, 11));
    }

    #[test]
    fn rejects_negative_start() {
        assert!(!is_valid_span(-1, 3, 10));
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert!(!is_valid_span(4, 4, 10));
        assert!(!is_valid_span(5, 4, 10));
    }

    #[test]
    fn rejects_end_past_length() {
        assert!(!is_valid_span(2, 11, 10));
        assert!(!is_valid_span(0, 1, 0));
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(char_len("আমি"), 3);
        assert_eq!("আমি".len(), 9);
    }

    #[test]
    fn slice_uses_character_offsets() {
        let text = "আমি ভাত খাই";
        assert_eq!(slice_span(text, 4, 7), Some("ভাত"));
    }

    #[test]
    fn slice_of_invalid_span_is_none() {
        assert_eq!(slice_span("short", 3, 9), None);
        assert_eq!(slice_span("short", 2, 2), None);
    }

    #[test]
    fn prefix_truncates_on_character_boundary() {
        assert_eq!(char_prefix("আমি ভাত", 2), "আম");
        assert_eq!(char_prefix("abc", 50), "abc");
    }
}
