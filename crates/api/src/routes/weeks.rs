use axum::routing::get;
use axum::Router;

use crate::handlers::weeks;
use crate::state::AppState;

/// ```text
/// GET  /weeks   -> list_weeks
/// PUT  /weeks   -> put_weeks (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/weeks", get(weeks::list_weeks).put(weeks::put_weeks))
}
