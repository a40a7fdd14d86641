//! Annotation export download.

use annotator_core::export::{build_records, write, ExportFormat, ExportSource};
use annotator_db::repositories::AnnotationRepo;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::access::{load_as_member, ProjectPath};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// GET /api/v1/users/{owner_id}/projects/{project_no}/export?format=csv|json
pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Query(params): Query<ExportParams>,
) -> AppResult<Response> {
    let scope = load_as_member(&state.pool, path, &user).await?;
    let format = ExportFormat::parse(params.format.as_deref())?;

    let sources: Vec<ExportSource> = AnnotationRepo::list_for_export(&state.pool, scope.id())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let records = build_records(sources);
    let body = write(&records, format)?;

    tracing::info!(
        project_id = scope.id(),
        format = format.extension(),
        annotations = records.len(),
        "Annotations exported"
    );

    let disposition = attachment_header(&scope.project.name, format)?;
    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `attachment; filename="{project}_annotations.{ext}"`. Quotes and control
/// characters in the project name are replaced.
fn attachment_header(project_name: &str, format: ExportFormat) -> AppResult<HeaderValue> {
    let safe_name: String = project_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let value = format!(
        "attachment; filename=\"{safe_name}_annotations.{}\"",
        format.extension()
    );
    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|e| AppError::InternalError(format!("Invalid export file name: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_project_name() {
        let header = attachment_header("Essays 2024", ExportFormat::Csv).unwrap();
        assert_eq!(header, "attachment; filename=\"Essays 2024_annotations.csv\"");
    }

    #[test]
    fn quotes_are_replaced_and_unicode_kept() {
        let header = attachment_header("বাংলা \"x\"", ExportFormat::Json).unwrap();
        assert_eq!(
            header.as_bytes(),
            "attachment; filename=\"বাংলা _x__annotations.json\"".as_bytes()
        );
    }
}
