use std::sync::atomic::{AtomicBool, Ordering};

use artweeks_cloud::UploadError;
use artweeks_core::error::CoreError;
use artweeks_db::kv::KvError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

/// Whether error responses carry the raw error text in `_original`.
static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable or disable `_original` in error responses (process-wide).
pub fn set_expose_error_details(enabled: bool) {
    EXPOSE_ERROR_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`KvError`] for store failures,
/// and adds HTTP-specific variants. Every variant renders the same JSON
/// envelope: `{ message, details, _original, code }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `artweeks_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A key-value store failure.
    #[error("Store error: {0}")]
    Store(#[from] KvError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No store backend is bound to this server.
    #[error("No data store is bound")]
    StoreUnavailable,

    /// An optional integration the route needs is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details): (StatusCode, &'static str, Value) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    json!(format!("{entity} {id} not found")),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", json!([msg]))
                }
                CoreError::InvalidFields(messages) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", json!(messages))
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", json!(msg)),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", json!(msg))
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", json!(msg)),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Store errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    json!("The data store failed to complete the request"),
                )
            }

            // --- Upload signing ---
            AppError::Upload(UploadError::ContentType(_)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                json!([self.to_string()]),
            ),
            AppError::Upload(err) => {
                tracing::error!(error = %err, "Upload signing failed");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", json!(msg)),
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                json!("No data store is bound to this server"),
            ),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                json!(msg),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let original = EXPOSE_ERROR_DETAILS
            .load(Ordering::Relaxed)
            .then(|| self.to_string());

        error_response(status, code, details, original)
    }
}

fn internal() -> (StatusCode, &'static str, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        json!("An internal error occurred"),
    )
}

/// Render the error envelope. Also used for responses that are not an
/// [`AppError`], such as the unknown-route fallback.
pub fn error_response(
    status: StatusCode,
    code: &str,
    details: Value,
    original: Option<String>,
) -> Response {
    let body = json!({
        "message": status.canonical_reason().unwrap_or("Error"),
        "details": details,
        "_original": original,
        "code": code,
    });
    (status, axum::Json(body)).into_response()
}
