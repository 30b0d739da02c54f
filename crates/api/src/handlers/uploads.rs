//! Handler for presigned uploads.

use artweeks_core::validation::validate_input;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /upload`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub filename: String,
    #[validate(length(min = 1, message = "is required"))]
    pub content_type: String,
}

/// POST /upload
///
/// Presigned `PUT` URL for one file under the caller's upload prefix.
/// 503 when object storage is not configured.
pub async fn create_upload(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UploadRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    let uploader = state
        .uploader
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Uploads are not configured".into()))?;

    let ticket = uploader
        .presign_put(&user.discord_id, &input.filename, &input.content_type)
        .await?;

    tracing::info!(
        artist_id = %user.discord_id,
        key = %ticket.key,
        content_type = %input.content_type,
        "Upload URL issued"
    );

    Ok(Json(DataResponse { data: ticket }))
}
