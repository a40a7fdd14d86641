//! Annotation entity model and DTOs.

use annotator_core::export::ExportSource;
use annotator_core::overlay::SpanAnnotation;
use annotator_core::span::slice_span;
use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `annotations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    /// Storage id of the annotated text.
    pub text_id: DbId,
    pub user_id: DbId,
    pub label_id: DbId,
    pub start_index: i64,
    pub end_index: i64,
    pub suggestions: Json<Vec<String>>,
    pub is_reannotation: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create-or-overwrite input for one (text, user, range).
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAnnotation {
    pub start_index: i64,
    pub end_index: i64,
    pub label_id: DbId,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub is_reannotation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSuggestions {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Result of an upsert on the (text, user, range) key.
#[derive(Debug, Clone, Copy, FromRow, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: DbId,
    /// `false` when an existing row for the same range was overwritten.
    pub inserted: bool,
}

/// An annotation joined with its label and annotator, ready for rendering.
#[derive(Debug, Clone, FromRow)]
pub struct AnnotationWithLabel {
    pub id: DbId,
    pub start_index: i64,
    pub end_index: i64,
    pub label: String,
    pub label_color: String,
    pub suggestions: Json<Vec<String>>,
    pub user_id: DbId,
    pub username: String,
}

impl AnnotationWithLabel {
    /// Convert for the overlay renderer, or `None` when the span no longer
    /// fits `content`.
    pub fn into_span(self, content: &str) -> Option<SpanAnnotation> {
        let annotated_text = slice_span(content, self.start_index, self.end_index)?.to_string();
        Some(SpanAnnotation {
            id: self.id,
            start_index: self.start_index,
            end_index: self.end_index,
            label: self.label,
            label_color: self.label_color,
            annotated_text,
            suggestions: self.suggestions.0,
            user_id: Some(self.user_id),
            username: Some(self.username),
        })
    }
}

/// One annotation joined with its text and label, in export order.
#[derive(Debug, Clone, FromRow)]
pub struct ExportRow {
    pub annotation_id: DbId,
    pub external_text_id: Option<String>,
    pub content: String,
    pub start_index: i64,
    pub end_index: i64,
    pub label: String,
    pub suggestions: Json<Vec<String>>,
}

impl From<ExportRow> for ExportSource {
    fn from(row: ExportRow) -> Self {
        Self {
            annotation_id: row.annotation_id,
            external_text_id: row.external_text_id,
            content: row.content,
            start_index: row.start_index,
            end_index: row.end_index,
            label: row.label,
            suggestions: row.suggestions.0,
        }
    }
}
