use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// ```text
/// POST /upload   -> create_upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(uploads::create_upload))
}
