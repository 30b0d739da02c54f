pub mod admin;
pub mod artists;
pub mod health;
pub mod uploads;
pub mod weeks;
pub mod works;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree (mounted at the root).
///
/// ```text
/// /weeks              list (GET), replace (PUT, staff)
/// /artists            list or look up (GET)
/// /artist             upsert own profile (PUT)
/// /works              list, filtered by artist or week (GET)
/// /work               get, submit or edit, soft delete (GET, PUT, DELETE)
/// /upload             presigned upload URL (POST)
/// /approve            approve or unapprove a work (POST, staff)
/// /reindex            rebuild work indexes (POST, staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(weeks::router())
        .merge(artists::router())
        .merge(works::router())
        .merge(uploads::router())
        .merge(admin::router())
}
