//! Handlers for project labels. Open to the owner and collaborators.

use annotator_core::error::CoreError;
use annotator_core::labels::{validate_color, validate_label_name};
use annotator_core::types::DbId;
use annotator_db::models::label::{CreateLabel, Label, UpdateLabel};
use annotator_db::repositories::LabelRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::access::{load_as_member, ProjectPath};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LabelPath {
    pub owner_id: DbId,
    pub project_no: i32,
    pub label_id: DbId,
}

impl LabelPath {
    fn project(self) -> ProjectPath {
        ProjectPath {
            owner_id: self.owner_id,
            project_no: self.project_no,
        }
    }
}

/// GET /api/v1/users/{owner_id}/projects/{project_no}/labels
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
) -> AppResult<Json<DataResponse<Vec<Label>>>> {
    let scope = load_as_member(&state.pool, path, &user).await?;
    let labels = LabelRepo::list(&state.pool, scope.id()).await?;
    Ok(Json(DataResponse::new(labels)))
}

/// POST /api/v1/users/{owner_id}/projects/{project_no}/labels
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Json(input): Json<CreateLabel>,
) -> AppResult<(StatusCode, Json<DataResponse<Label>>)> {
    let scope = load_as_member(&state.pool, path, &user).await?;
    let input = CreateLabel {
        name: validate_label_name(&input.name)?.to_string(),
        color: input
            .color
            .as_deref()
            .map(validate_color)
            .transpose()?
            .map(str::to_string),
        description: input.description,
    };

    let label = LabelRepo::create(&state.pool, scope.id(), user.user_id, &input).await?;
    tracing::info!(project_id = scope.id(), label_id = label.id, name = %label.name, "Label created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(label))))
}

/// PUT /api/v1/users/{owner_id}/projects/{project_no}/labels/{label_id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<LabelPath>,
    Json(input): Json<UpdateLabel>,
) -> AppResult<Json<DataResponse<Label>>> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    ensure_label(&state, scope.id(), path.label_id).await?;

    let input = UpdateLabel {
        name: input
            .name
            .as_deref()
            .map(validate_label_name)
            .transpose()?
            .map(str::to_string),
        color: input
            .color
            .as_deref()
            .map(validate_color)
            .transpose()?
            .map(str::to_string),
        description: input.description,
    };

    let label = LabelRepo::update(&state.pool, path.label_id, &input)
        .await?
        .ok_or(label_not_found(path.label_id))?;
    Ok(Json(DataResponse::new(label)))
}

/// DELETE /api/v1/users/{owner_id}/projects/{project_no}/labels/{label_id}
///
/// Annotations using the label are deleted with it.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<LabelPath>,
) -> AppResult<StatusCode> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    ensure_label(&state, scope.id(), path.label_id).await?;

    LabelRepo::delete(&state.pool, path.label_id).await?;
    tracing::info!(project_id = scope.id(), label_id = path.label_id, "Label deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_label(state: &AppState, project_id: DbId, label_id: DbId) -> AppResult<Label> {
    LabelRepo::find_in_project(&state.pool, project_id, label_id)
        .await?
        .ok_or(label_not_found(label_id))
}

fn label_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Label",
        id,
    })
}
