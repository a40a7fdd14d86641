use serde::Serialize;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The actor is neither the owner nor a collaborator required for the
    /// operation. Raised before any mutation happens.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Fatal import failures. Any of these aborts the whole import and the
/// enclosing transaction is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// None of the candidate encodings could decode the uploaded bytes.
    #[error("Could not decode the {file}. Please ensure it is properly encoded.")]
    Decode { file: &'static str },

    /// A required column is missing, or the file has no header row.
    #[error("{0}")]
    Schema(String),

    /// The tabular data could not be read at all.
    #[error("Malformed CSV in the {file}: {message}")]
    Csv { file: &'static str, message: String },
}

/// A per-row problem that was skipped. Never aborts an import; accumulated
/// and returned alongside the import summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    /// 1-based data row number (the header row is not counted).
    pub row: usize,
    pub message: String,
}

impl RowWarning {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}
