//! Handlers for the annotate view and annotation writes.
//!
//! Reads never delete anything: spans that no longer fit the text are left
//! out of the response and only removed by the explicit repair endpoint.

use annotator_core::error::CoreError;
use annotator_core::overlay::{render, SpanAnnotation};
use annotator_core::span::{char_len, is_valid_span};
use annotator_core::types::DbId;
use annotator_db::models::annotation::{SaveAnnotation, UpdateSuggestions};
use annotator_db::models::label::Label;
use annotator_db::models::text::Text;
use annotator_db::repositories::{AnnotationRepo, LabelRepo, TextRepo};
use annotator_db::DbPool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::access::{load_as_member, ProjectPath, TextPath};
use crate::error::{AppError, AppResult};
use crate::handlers::text::text_not_found;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnnotationPath {
    pub owner_id: DbId,
    pub project_no: i32,
    pub text_id: DbId,
    pub annotation_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct TextView {
    pub text: Text,
    pub labels: Vec<Label>,
    pub annotations: Vec<SpanAnnotation>,
    pub rendered_html: String,
}

#[derive(Debug, Serialize)]
pub struct RepairResult {
    pub purged: u64,
    pub annotations: Vec<SpanAnnotation>,
}

/// `{ "id": .., "created": true }` or `{ "id": .., "updated": true }`.
#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub id: DbId,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub created: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub updated: bool,
}

/// GET /api/v1/users/{owner_id}/projects/{project_no}/texts/{text_id}
pub async fn view(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<TextPath>,
) -> AppResult<Json<DataResponse<TextView>>> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    let text = find_text(&state.pool, scope.id(), path.text_id).await?;

    let labels = LabelRepo::list(&state.pool, scope.id()).await?;
    let annotations = valid_spans(&state.pool, &text).await?;
    let rendered_html = render(&text.text, &annotations);

    Ok(Json(DataResponse::new(TextView {
        text,
        labels,
        annotations,
        rendered_html,
    })))
}

/// POST /api/v1/users/{owner_id}/projects/{project_no}/texts/{text_id}/annotations/repair
///
/// Delete annotations whose span no longer fits the current content.
pub async fn repair(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<TextPath>,
) -> AppResult<Json<DataResponse<RepairResult>>> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    let text = find_text(&state.pool, scope.id(), path.text_id).await?;

    let purged = AnnotationRepo::purge_invalid(&state.pool, text.id).await?;
    if purged > 0 {
        tracing::info!(text_id = text.id, purged, "Purged annotations with stale spans");
    }
    let annotations = valid_spans(&state.pool, &text).await?;

    Ok(Json(DataResponse::new(RepairResult {
        purged,
        annotations,
    })))
}

/// POST /api/v1/users/{owner_id}/projects/{project_no}/texts/{text_id}/annotations
///
/// A second submission by the same user for the same range overwrites the
/// first, whatever its label.
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<TextPath>,
    Json(input): Json<SaveAnnotation>,
) -> AppResult<(StatusCode, Json<DataResponse<SaveResult>>)> {
    let scope = load_as_member(&state.pool, path.project(), &user).await?;
    let text = find_text(&state.pool, scope.id(), path.text_id).await?;

    if !is_valid_span(input.start_index, input.end_index, char_len(&text.text)) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid text range".into(),
        )));
    }
    LabelRepo::find_in_project(&state.pool, scope.id(), input.label_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id: input.label_id,
        }))?;

    let outcome =
        AnnotationRepo::upsert_for_range(&state.pool, text.id, user.user_id, &input).await?;

    tracing::info!(
        annotation_id = outcome.id,
        text_id = text.id,
        user_id = user.user_id,
        start = input.start_index,
        end = input.end_index,
        created = outcome.inserted,
        "Annotation saved"
    );

    let status = if outcome.inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse::new(SaveResult {
            id: outcome.id,
            created: outcome.inserted,
            updated: !outcome.inserted,
        })),
    ))
}

/// PUT /api/v1/users/{owner_id}/projects/{project_no}/texts/{text_id}/annotations/{annotation_id}
///
/// Replace the suggestions of one of the caller's own annotations.
pub async fn update_suggestions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<AnnotationPath>,
    Json(input): Json<UpdateSuggestions>,
) -> AppResult<Json<DataResponse<SaveResult>>> {
    let project = ProjectPath {
        owner_id: path.owner_id,
        project_no: path.project_no,
    };
    let scope = load_as_member(&state.pool, project, &user).await?;
    let text = find_text(&state.pool, scope.id(), path.text_id).await?;

    let suggestions: Vec<String> = input
        .suggestions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let annotation = AnnotationRepo::update_suggestions(
        &state.pool,
        path.annotation_id,
        text.id,
        user.user_id,
        &suggestions,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Annotation",
        id: path.annotation_id,
    }))?;

    Ok(Json(DataResponse::new(SaveResult {
        id: annotation.id,
        created: false,
        updated: true,
    })))
}

/// DELETE /api/v1/annotations/{annotation_id}
///
/// Only the annotator may delete their annotation.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(annotation_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let annotation = AnnotationRepo::find_by_id(&state.pool, annotation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Annotation",
            id: annotation_id,
        }))?;

    if annotation.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own annotations".into(),
        )));
    }

    AnnotationRepo::delete_own(&state.pool, annotation_id, user.user_id).await?;
    tracing::info!(annotation_id, user_id = user.user_id, "Annotation deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_text(pool: &DbPool, project_id: DbId, text_id: DbId) -> AppResult<Text> {
    TextRepo::find_in_project(pool, project_id, text_id)
        .await?
        .ok_or(text_not_found(text_id))
}

/// Annotations of a text whose span still fits its content.
async fn valid_spans(pool: &DbPool, text: &Text) -> AppResult<Vec<SpanAnnotation>> {
    Ok(AnnotationRepo::list_for_text(pool, text.id)
        .await?
        .into_iter()
        .filter_map(|a| a.into_span(&text.text))
        .collect())
}
