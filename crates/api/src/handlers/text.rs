//! Handlers for creating and editing single texts.

use annotator_core::error::CoreError;
use annotator_core::importer::normalize_content;
use annotator_core::types::DbId;
use annotator_db::models::text::{CreateText, Text, UpdateText};
use annotator_db::repositories::TextRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::access::{load_as_member, ProjectPath, TextPath};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users/{owner_id}/projects/{project_no}/texts
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Json(input): Json<CreateText>,
) -> AppResult<(StatusCode, Json<DataResponse<Text>>)> {
    let scope = load_as_member(&state.pool, path, &user).await?;
    let input = CreateText {
        text_id: non_blank(input.text_id),
        text: required_content(&input.text)?,
        meta: input.meta,
    };

    let text = TextRepo::create(&state.pool, scope.id(), &input).await?;
    tracing::info!(project_id = scope.id(), text_id = text.id, "Text created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(text))))
}

/// PUT /api/v1/users/{owner_id}/projects/{project_no}/texts/{text_id}
///
/// Shortening the content can invalidate stored spans; they stay in place
/// until the repair endpoint is called.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<TextPath>,
    Json(input): Json<UpdateText>,
) -> AppResult<Json<DataResponse<Text>>> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    TextRepo::find_in_project(&state.pool, scope.id(), path.text_id)
        .await?
        .ok_or(text_not_found(path.text_id))?;

    let input = UpdateText {
        text_id: non_blank(input.text_id),
        text: input.text.as_deref().map(required_content).transpose()?,
        meta: input.meta,
    };

    let text = TextRepo::update(&state.pool, path.text_id, &input)
        .await?
        .ok_or(text_not_found(path.text_id))?;
    tracing::info!(project_id = scope.id(), text_id = text.id, "Text updated");
    Ok(Json(DataResponse::new(text)))
}

pub(crate) fn text_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Text", id })
}

fn required_content(raw: &str) -> AppResult<String> {
    let content = normalize_content(raw);
    if content.is_empty() {
        return Err(CoreError::Validation("Text content is required.".into()).into());
    }
    Ok(content)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
