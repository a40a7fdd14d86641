//! Owner-only management of project collaborators.

use annotator_core::error::CoreError;
use annotator_core::types::DbId;
use annotator_db::models::collaborator::{AddCollaborator, Collaborator};
use annotator_db::repositories::{CollaboratorRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::access::{load_as_owner, ProjectPath};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CollaboratorPath {
    pub owner_id: DbId,
    pub project_no: i32,
    pub user_id: DbId,
}

/// GET /api/v1/users/{owner_id}/projects/{project_no}/collaborators
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
) -> AppResult<Json<DataResponse<Vec<Collaborator>>>> {
    let scope = load_as_owner(&state.pool, path, &user).await?;
    let collaborators = CollaboratorRepo::list(&state.pool, scope.id()).await?;
    Ok(Json(DataResponse::new(collaborators)))
}

/// POST /api/v1/users/{owner_id}/projects/{project_no}/collaborators
///
/// Adding someone who already collaborates succeeds without change.
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Json(input): Json<AddCollaborator>,
) -> AppResult<Json<DataResponse<Vec<Collaborator>>>> {
    let scope = load_as_owner(&state.pool, path, &user).await?;

    let username = input.username.trim();
    let invitee = UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("User \"{username}\" not found")))?;

    if invitee.id == scope.project.owner_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot add owner as collaborator".into(),
        )));
    }

    if CollaboratorRepo::add(&state.pool, scope.id(), invitee.id).await? {
        tracing::info!(project_id = scope.id(), user_id = invitee.id, "Collaborator added");
    }

    let collaborators = CollaboratorRepo::list(&state.pool, scope.id()).await?;
    Ok(Json(DataResponse::new(collaborators)))
}

/// DELETE /api/v1/users/{owner_id}/projects/{project_no}/collaborators/{user_id}
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<CollaboratorPath>,
) -> AppResult<StatusCode> {
    let project = ProjectPath {
        owner_id: path.owner_id,
        project_no: path.project_no,
    };
    let scope = load_as_owner(&state.pool, project, &user).await?;

    if !CollaboratorRepo::remove(&state.pool, scope.id(), path.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Collaborator",
            id: path.user_id,
        }));
    }
    tracing::info!(project_id = scope.id(), user_id = path.user_id, "Collaborator removed");
    Ok(StatusCode::NO_CONTENT)
}
