//! Staff-only routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// POST /approve   -> approve_work
/// POST /reindex   -> reindex
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/approve", post(admin::approve_work))
        .route("/reindex", post(admin::reindex))
}
