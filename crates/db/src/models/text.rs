//! Text entity model and DTOs.

use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A text row. `text_id` is the caller's external identifier, `id` the
/// storage identity annotations point at.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Text {
    pub id: DbId,
    pub project_id: DbId,
    pub text_id: Option<String>,
    pub text: String,
    pub meta: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A text with the number of annotations on it, for project pages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TextWithCount {
    pub id: DbId,
    pub text_id: Option<String>,
    pub text: String,
    pub annotation_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateText {
    pub text_id: Option<String>,
    pub text: String,
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateText {
    pub text_id: Option<String>,
    pub text: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// What an import did with one text row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUpsertOutcome {
    Created,
    Updated,
    Unchanged,
}
