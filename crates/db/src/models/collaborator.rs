use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A collaborator of a project, joined with the user's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collaborator {
    pub user_id: DbId,
    pub username: String,
    pub added_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCollaborator {
    pub username: String,
}
