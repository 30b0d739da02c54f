use axum::routing::{get, put};
use axum::Router;

use crate::handlers::artists;
use crate::state::AppState;

/// ```text
/// GET  /artists   -> list_artists
/// PUT  /artist    -> put_artist
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/artists", get(artists::list_artists))
        .route("/artist", put(artists::put_artist))
}
