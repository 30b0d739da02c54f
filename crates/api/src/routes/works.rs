use axum::routing::get;
use axum::Router;

use crate::handlers::works;
use crate::state::AppState;

/// ```text
/// GET     /works   -> list_works
/// GET     /work    -> get_work
/// PUT     /work    -> put_work
/// DELETE  /work    -> delete_work
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/works", get(works::list_works))
        .route(
            "/work",
            get(works::get_work)
                .put(works::put_work)
                .delete(works::delete_work),
        )
}
