pub mod admin;
pub mod artists;
pub mod uploads;
pub mod weeks;
pub mod works;

use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use serde_json::json;

use crate::error::error_response;

/// Fallback for unknown routes and unrouted methods: 404 in the error envelope.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        json!(format!("No route for {method} {}", uri.path())),
        None,
    )
}
