//! Turning parsed annotation rows into rows to insert.

use std::collections::{HashMap, HashSet};

use crate::error::RowWarning;
use crate::importer::TextKey;
use crate::span::{char_len, is_valid_span};
use crate::types::DbId;

/// A stored text that annotation rows can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTarget {
    pub text_id: DbId,
    /// Current content length in characters.
    pub char_len: i64,
}

/// How the end index is derived when the row's span text overshoots the
/// stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndIndexPolicy {
    /// Overshooting spans are rejected with a row warning.
    Strict,
    /// The end is clamped to the content length before validation.
    Clamp,
}

/// One annotation row as read from a file, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationCandidate {
    pub row: usize,
    /// The text the row refers to.
    pub text_key: TextKey,
    pub start_index: String,
    pub label: String,
    /// The annotated substring; its length determines the end index.
    pub span_text: String,
    pub suggestions: Vec<String>,
}

/// A validated annotation ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAnnotation {
    pub row: usize,
    pub text_id: DbId,
    pub start_index: i64,
    pub end_index: i64,
    pub label: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPlan {
    pub annotations: Vec<PlannedAnnotation>,
    /// Rows repeating an earlier (text, start, end) in the same file.
    pub duplicates: usize,
    pub warnings: Vec<RowWarning>,
}

impl AnnotationPlan {
    /// Distinct label names in first-use order.
    pub fn label_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.annotations
            .iter()
            .map(|a| a.label.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

/// Resolve, validate, and deduplicate annotation rows.
///
/// Rows with a blank text key, start index, or label are skipped silently.
/// Unknown text keys, non-numeric start indices, and out-of-range spans
/// produce a [`RowWarning`] and skip only that row.
pub fn plan_annotations(
    candidates: &[AnnotationCandidate],
    targets: &HashMap<TextKey, TextTarget>,
    policy: EndIndexPolicy,
) -> AnnotationPlan {
    let mut plan = AnnotationPlan::default();
    let mut seen: HashSet<(DbId, i64, i64)> = HashSet::new();

    for candidate in candidates {
        let text_key = &candidate.text_key;
        let start_raw = candidate.start_index.trim();
        let label = candidate.label.trim();
        if text_key.is_blank() || start_raw.is_empty() || label.is_empty() {
            continue;
        }

        let Some(target) = targets.get(text_key) else {
            plan.warnings.push(RowWarning::new(
                candidate.row,
                format!("No text found with ID {text_key}. Skipping annotation."),
            ));
            continue;
        };

        let Ok(start) = start_raw.parse::<i64>() else {
            plan.warnings.push(RowWarning::new(
                candidate.row,
                format!("Invalid start_index \"{start_raw}\". Skipping annotation."),
            ));
            continue;
        };

        let span_len = if candidate.span_text.is_empty() {
            1
        } else {
            char_len(&candidate.span_text)
        };
        let Some(mut end) = start.checked_add(span_len) else {
            plan.warnings.push(RowWarning::new(
                candidate.row,
                format!(
                    "Invalid text range {start}-(overflow) for text ID {text_key}. Skipping annotation."
                ),
            ));
            continue;
        };
        if policy == EndIndexPolicy::Clamp {
            end = end.min(target.char_len);
        }

        if !is_valid_span(start, end, target.char_len) {
            plan.warnings.push(RowWarning::new(
                candidate.row,
                format!(
                    "Invalid text range {start}-{end} for text ID {text_key}. Skipping annotation."
                ),
            ));
            continue;
        }

        if !seen.insert((target.text_id, start, end)) {
            plan.duplicates += 1;
            continue;
        }

        plan.annotations.push(PlannedAnnotation {
            row: candidate.row,
            text_id: target.text_id,
            start_index: start,
            end_index: end,
            label: label.to_string(),
            suggestions: candidate.suggestions.clone(),
        });
    }

    plan
}
