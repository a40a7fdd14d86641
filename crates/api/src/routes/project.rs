//! Route definitions for projects and everything scoped to one project.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{annotation, collaborator, export, import, label, project, text};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /    -> list (owned and shared)
/// POST   /    -> create
/// ```
pub fn collection_router() -> Router<AppState> {
    Router::new().route("/", get(project::list).post(project::create))
}

/// Routes mounted at `/users/{owner_id}/projects/{project_no}`.
///
/// ```text
/// GET    /                                          -> project::detail (?page=)
/// PUT    /                                          -> project::update
/// DELETE /                                          -> project::delete
///
/// GET    /labels                                    -> label::list
/// POST   /labels                                    -> label::create
/// PUT    /labels/{label_id}                         -> label::update
/// DELETE /labels/{label_id}                         -> label::delete
///
/// POST   /texts                                     -> text::create
/// GET    /texts/{text_id}                           -> annotation::view
/// PUT    /texts/{text_id}                           -> text::update
/// POST   /texts/{text_id}/annotations               -> annotation::save
/// POST   /texts/{text_id}/annotations/repair        -> annotation::repair
/// PUT    /texts/{text_id}/annotations/{annotation_id} -> annotation::update_suggestions
///
/// GET    /collaborators                             -> collaborator::list
/// POST   /collaborators                             -> collaborator::add
/// DELETE /collaborators/{user_id}                   -> collaborator::remove
///
/// POST   /import                                    -> import::import
/// GET    /export                                    -> export::export
/// ```
pub fn router() -> Router<AppState> {
    let text_routes = Router::new()
        .route("/", post(text::create))
        .route("/{text_id}", get(annotation::view).put(text::update))
        .route("/{text_id}/annotations", post(annotation::save))
        .route("/{text_id}/annotations/repair", post(annotation::repair))
        .route(
            "/{text_id}/annotations/{annotation_id}",
            put(annotation::update_suggestions),
        );

    let label_routes = Router::new()
        .route("/", get(label::list).post(label::create))
        .route("/{label_id}", put(label::update).delete(label::delete));

    let collaborator_routes = Router::new()
        .route("/", get(collaborator::list).post(collaborator::add))
        .route("/{user_id}", axum::routing::delete(collaborator::remove));

    Router::new()
        .route(
            "/",
            get(project::detail)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/labels", label_routes)
        .nest("/texts", text_routes)
        .nest("/collaborators", collaborator_routes)
        .route("/import", post(import::import))
        .route("/export", get(export::export))
}
