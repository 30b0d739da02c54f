//! Handlers for challenge weeks.
//!
//! Reads are public (unpublished weeks are staff-only). Writes replace the
//! whole aggregate and announce published weeks on Discord.

use artweeks_core::error::CoreError;
use artweeks_core::validation::collect_messages;
use artweeks_db::models::week::{carry_over_discord_ids, check_unique_weeks, Week};
use artweeks_db::repositories::WeekRepo;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::background::announce;
use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::auth::Caller;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /weeks
///
/// All weeks sorted by `(year, week)`. Non-staff see published weeks only.
pub async fn list_weeks(
    caller: Caller,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let store = state.store()?;
    let weeks = if caller.is_staff {
        WeekRepo::list(store).await?
    } else {
        WeekRepo::list_published(store).await?
    };

    Ok(Json(DataResponse { data: weeks }))
}

/// PUT /weeks
///
/// Replace the whole aggregate. Staff only. Published weeks that are new,
/// newly published, or whose announced content changed are (re)announced
/// in the background.
pub async fn put_weeks(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    JsonBody(mut weeks): JsonBody<Vec<Week>>,
) -> AppResult<impl IntoResponse> {
    validate_weeks(&weeks)?;
    let store = state.store()?;

    let guard = store.lock_writes().await;
    let existing = WeekRepo::list(store).await?;
    carry_over_discord_ids(&existing, &mut weeks);
    let saved = WeekRepo::replace_all_locked(store, &guard, weeks).await?;
    drop(guard);

    tracing::info!(
        count = saved.len(),
        user_id = %staff.discord_id,
        "Weeks updated"
    );

    let pending: Vec<Week> = saved
        .iter()
        .filter(|w| needs_announcement(&existing, w))
        .cloned()
        .collect();
    announce::spawn_week_announcements(store.clone(), state.notifier.clone(), pending);

    Ok(Json(DataResponse { data: saved }))
}

/// Published weeks that are unannounced, new, newly published, or whose
/// announced content changed.
fn needs_announcement(existing: &[Week], week: &Week) -> bool {
    if !week.is_published {
        return false;
    }
    let previous = existing.iter().find(|e| e.key() == week.key());
    let changed = previous.map_or(true, |p| !p.is_published || p.announcement_differs(week));
    week.discord_id.is_none() || changed
}

/// Field checks on every week, then uniqueness of `(year, week)`.
fn validate_weeks(weeks: &[Week]) -> Result<(), CoreError> {
    let mut messages = Vec::new();
    for (i, week) in weeks.iter().enumerate() {
        if let Err(errors) = week.validate() {
            messages.extend(
                collect_messages(&errors)
                    .into_iter()
                    .map(|m| format!("[{i}].{m}")),
            );
        }
    }
    if !messages.is_empty() {
        return Err(CoreError::InvalidFields(messages));
    }
    check_unique_weeks(weeks).map_err(CoreError::Validation)
}
