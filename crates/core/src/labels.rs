//! Label palette and name/colour validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Colour used when a label colour is missing or not `#RRGGBB`.
pub const DEFAULT_LABEL_COLOR: &str = "#000000";

/// Colour given to labels created on the fly during import.
pub const NEUTRAL_LABEL_COLOR: &str = "#444040";

pub const MAX_LABEL_NAME_LEN: usize = 100;
pub const MAX_PROJECT_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLabel {
    pub name: &'static str,
    pub color: &'static str,
}

const fn label(name: &'static str, color: &'static str) -> DefaultLabel {
    DefaultLabel { name, color }
}

/// Labels seeded into every new project, flagged `is_static`.
pub const DEFAULT_LABELS: &[DefaultLabel] = &[
    label("SUB_VERB_AGREEMENT_ERROR", "#EA6B6B"),
    label("SADHU_CHALIT_MIX_ERROR", "#69F869"),
    label("PUNCTUATION_ERROR", "#8383E2"),
    label("NON_WORD_ERROR", "#F1F14A"),
    label("UNKNOWN_WORD", "#F455F4"),
    label("INFLECTION_ERROR", "#00FFFF"),
    label("NO_SPACE_ERROR", "#956F6F"),
    label("EXTAR_SPACE_ERROR", "#41A441"),
    label("INAPPROPRIATE_WORD_USAGE_ERROR", "#505A68"),
    label("PREPOSITION_CONJUNCTION_ERROR", "#8E8E45"),
    label("REPETITION_ERROR", "#985298"),
    label("QUALITY_SENTENCE_ERROR", "#389494"),
    label("REAL_WORD_ERROR", "#726969"),
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Validate a user-supplied colour, returning it unchanged.
pub fn validate_color(value: &str) -> Result<&str, CoreError> {
    let trimmed = value.trim();
    if is_hex_color(trimmed) {
        Ok(trimmed)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid colour \"{value}\". Expected #RRGGBB."
        )))
    }
}

/// Trim and validate a label name.
pub fn validate_label_name(name: &str) -> Result<&str, CoreError> {
    validate_name(name, "Label name", MAX_LABEL_NAME_LEN)
}

/// Trim and validate a project name.
pub fn validate_project_name(name: &str) -> Result<&str, CoreError> {
    validate_name(name, "Project name", MAX_PROJECT_NAME_LEN)
}

fn validate_name<'a>(name: &'a str, what: &str, max: usize) -> Result<&'a str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{what} is required.")));
    }
    if trimmed.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{what} must be at most {max} characters."
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hex_colours() {
        assert!(is_hex_color("#EA6B6B"));
        assert!(is_hex_color("#00ffff"));
        assert!(!is_hex_color("EA6B6B"));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("#GGGGGG"));
        assert!(!is_hex_color("#000000; color: red"));
    }

    #[test]
    fn default_palette_is_valid() {
        assert_eq!(DEFAULT_LABELS.len(), 13);
        assert!(DEFAULT_LABELS.iter().all(|l| is_hex_color(l.color)));
        assert!(is_hex_color(DEFAULT_LABEL_COLOR));
        assert!(is_hex_color(NEUTRAL_LABEL_COLOR));
    }

    #[test]
    fn colour_validation_trims() {
        assert_eq!(validate_color(" #123abc ").unwrap(), "#123abc");
        assert_matches!(validate_color("blue"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_label_name("  NOUN ").unwrap(), "NOUN");
        assert_matches!(validate_label_name("   "), Err(CoreError::Validation(_)));
        let long = "ক".repeat(MAX_LABEL_NAME_LEN + 1);
        assert_matches!(validate_label_name(&long), Err(CoreError::Validation(_)));
        assert!(validate_project_name(&"ক".repeat(MAX_LABEL_NAME_LEN + 1)).is_ok());
    }
}
