//! Staff-only handlers: approval and index reconciliation.

use artweeks_core::error::CoreError;
use artweeks_db::models::work::ApproveWork;
use artweeks_db::repositories::WorkRepo;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use super::works::{check_work_id, find_live_work};
use crate::background::announce;
use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /approve
///
/// Set `isApproved` on a work. Approved works are announced on Discord (or
/// their announcement is edited) in the background; the message id is
/// stored on the work once Discord answers.
pub async fn approve_work(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ApproveWork>,
) -> AppResult<impl IntoResponse> {
    check_work_id(&input.id)?;
    let store = state.store()?;
    find_live_work(store, &input.id).await?;

    let work = WorkRepo::set_approval(store, &input.id, input.is_approved)
        .await?
        .ok_or_else(|| CoreError::not_found("Work", &input.id))?;
    tracing::info!(
        work_id = %work.id,
        approved = work.is_approved,
        user_id = %staff.discord_id,
        "Work approval set"
    );

    if work.is_approved {
        announce::spawn_work_announcement(store.clone(), state.notifier.clone(), work.clone());
    }

    Ok(Json(DataResponse { data: work }))
}

/// POST /reindex
///
/// Rebuild every derived work index from the by-id records.
pub async fn reindex(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let store = state.store()?;
    let report = WorkRepo::reindex(store).await?;
    tracing::info!(user_id = %staff.discord_id, listed = report.listed, "Reindex requested");

    Ok(Json(DataResponse { data: report }))
}
