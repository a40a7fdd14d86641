//! Handlers for projects.

use std::collections::HashMap;

use annotator_core::labels::validate_project_name;
use annotator_core::overlay::{render, SpanAnnotation};
use annotator_core::types::DbId;
use annotator_db::models::label::Label;
use annotator_db::models::project::{CreateProject, Project, ProjectListItem, UpdateProject};
use annotator_db::repositories::{AnnotationRepo, LabelRepo, ProjectRepo, TextRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::access::{load_as_member, load_as_owner, ProjectPath};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// A text on the project page with its annotations overlaid.
#[derive(Debug, Serialize)]
pub struct TextCard {
    pub id: DbId,
    pub text_id: Option<String>,
    pub annotation_count: i64,
    pub rendered_html: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub is_owner: bool,
    pub labels: Vec<Label>,
    pub texts: Vec<TextCard>,
    pub page: i64,
    pub total_pages: i64,
    pub total_texts: i64,
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let input = CreateProject {
        name: validate_project_name(&input.name)?.to_string(),
        description: input.description,
    };
    let project = ProjectRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        project_id = project.id,
        owner_id = user.user_id,
        user_project_id = project.user_project_id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(project))))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ProjectListItem>>>> {
    let projects = ProjectRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(projects)))
}

/// GET /api/v1/users/{owner_id}/projects/{project_no}?page=N
pub async fn detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let scope = load_as_member(&state.pool, path, &user).await?;
    let page_size = state.config.texts_page_size;

    let labels = LabelRepo::list(&state.pool, scope.id()).await?;
    let total_texts = TextRepo::count(&state.pool, scope.id()).await?;
    let total_pages = ((total_texts + page_size - 1) / page_size).max(1);
    let page = params.page.unwrap_or(1).clamp(1, total_pages);

    let texts =
        TextRepo::list_page(&state.pool, scope.id(), page_size, (page - 1) * page_size).await?;
    let text_ids: Vec<DbId> = texts.iter().map(|t| t.id).collect();

    let mut by_text: HashMap<DbId, Vec<_>> = HashMap::new();
    for (text_id, ann) in AnnotationRepo::list_for_texts(&state.pool, &text_ids).await? {
        by_text.entry(text_id).or_default().push(ann);
    }

    let cards = texts
        .into_iter()
        .map(|t| {
            let spans: Vec<SpanAnnotation> = by_text
                .remove(&t.id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| a.into_span(&t.text))
                .collect();
            TextCard {
                id: t.id,
                text_id: t.text_id,
                annotation_count: t.annotation_count,
                rendered_html: render(&t.text, &spans),
            }
        })
        .collect();

    Ok(Json(DataResponse::new(ProjectDetail {
        is_owner: scope.project.owner_id == user.user_id,
        project: scope.project,
        labels,
        texts: cards,
        page,
        total_pages,
        total_texts,
    })))
}

/// PUT /api/v1/users/{owner_id}/projects/{project_no}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let scope = load_as_owner(&state.pool, path, &user).await?;
    let input = UpdateProject {
        name: input
            .name
            .as_deref()
            .map(validate_project_name)
            .transpose()?
            .map(str::to_string),
        description: input.description,
    };

    let project = ProjectRepo::update(&state.pool, scope.id(), &input)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(Json(DataResponse::new(project)))
}

/// DELETE /api/v1/users/{owner_id}/projects/{project_no}
///
/// The owner's remaining projects are renumbered to stay 1..N.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
) -> AppResult<StatusCode> {
    let scope = load_as_owner(&state.pool, path, &user).await?;
    if !ProjectRepo::delete(&state.pool, scope.id(), user.user_id).await? {
        return Err(sqlx::Error::RowNotFound.into());
    }
    tracing::info!(project_id = scope.id(), owner_id = user.user_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
