//! Label entity model and DTOs.

use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Label {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    /// `#RRGGBB`.
    pub color: String,
    pub description: Option<String>,
    /// Seeded with the project rather than created by a user.
    pub is_static: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabel {
    pub name: String,
    /// Defaults to black if omitted.
    pub color: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLabel {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}
