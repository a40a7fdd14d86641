use axum::routing::delete;
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Routes mounted at `/annotations`.
///
/// ```text
/// DELETE /{annotation_id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{annotation_id}", delete(annotation::delete))
}
