pub mod annotation;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                             list, create
/// /users/{owner_id}/projects/{project_no}               detail, update, delete
/// /users/{owner_id}/projects/{project_no}/labels        list, create
/// /users/{owner_id}/projects/{project_no}/labels/{id}   update, delete
/// /users/{owner_id}/projects/{project_no}/texts         create
/// /users/{owner_id}/projects/{project_no}/texts/{id}    view, update
/// /users/{owner_id}/projects/{project_no}/texts/{id}/annotations         save (POST)
/// /users/{owner_id}/projects/{project_no}/texts/{id}/annotations/repair  purge stale (POST)
/// /users/{owner_id}/projects/{project_no}/texts/{id}/annotations/{id}    suggestions (PUT)
/// /users/{owner_id}/projects/{project_no}/collaborators                  list, add
/// /users/{owner_id}/projects/{project_no}/collaborators/{user_id}        remove
/// /users/{owner_id}/projects/{project_no}/import        CSV import (multipart POST)
/// /users/{owner_id}/projects/{project_no}/export        download (?format=csv|json)
///
/// /annotations/{id}                                     delete (annotator only)
/// ```
///
/// Every route requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::collection_router())
        .nest("/users/{owner_id}/projects/{project_no}", project::router())
        .nest("/annotations", annotation::router())
}
