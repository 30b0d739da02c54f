//! Handlers for works: listing, single reads, submission, edits, and
//! soft deletion.
//!
//! A work is visible when it is not deleted and either approved, owned by
//! the caller, or the caller is staff.

use artweeks_core::error::CoreError;
use artweeks_core::short_id::{determine_short_id, is_short_id};
use artweeks_core::validation::validate_input;
use artweeks_core::weeks::{validate_week_number, validate_year};
use artweeks_db::models::work::{PutWork, Work, WorkIdParams, WorkItem, WorkListParams};
use artweeks_db::repositories::{ArtistRepo, WeekRepo, WorkRepo};
use artweeks_db::Store;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use crate::background::announce;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::auth::{AuthUser, Caller};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /works
///
/// `?artistId=`, or `?year=&week=`, or no filter for everything. Works the
/// caller may not see are left out. Newest first.
pub async fn list_works(
    caller: Caller,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<WorkListParams>,
) -> AppResult<impl IntoResponse> {
    let store = state.store()?;

    let mut works = match (&params.artist_id, params.year, params.week) {
        (Some(artist_id), None, None) => WorkRepo::list_by_artist(store, artist_id).await?,
        (None, Some(year), Some(week)) => {
            validate_year(year).map_err(CoreError::Validation)?;
            validate_week_number(week).map_err(CoreError::Validation)?;
            WorkRepo::list_by_week(store, year, week).await?
        }
        (None, None, None) => WorkRepo::list_all(store).await?,
        _ => {
            return Err(AppError::BadRequest(
                "Filter by artistId alone, or by year and week together".into(),
            ))
        }
    };

    works.retain(|w| w.is_visible_to(caller.id(), caller.is_staff));
    works.sort_by(|a, b| {
        b.submitted_timestamp
            .cmp(&a.submitted_timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(Json(DataResponse { data: works }))
}

/// GET /work?id=
///
/// One work. Deleted works are 404 except for staff; unapproved works are
/// 404 except for the owner and staff.
pub async fn get_work(
    caller: Caller,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<WorkIdParams>,
) -> AppResult<impl IntoResponse> {
    check_work_id(&params.id)?;
    let store = state.store()?;

    let work = WorkRepo::find_by_id(store, &params.id)
        .await?
        .filter(|w| {
            if w.is_deleted() {
                caller.is_staff
            } else {
                w.is_visible_to(caller.id(), caller.is_staff)
            }
        })
        .ok_or_else(|| CoreError::not_found("Work", &params.id))?;

    Ok(Json(DataResponse { data: work }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// PUT /work
///
/// Without `id`: submit a new work (201). With `id`: edit an existing work
/// as its owner or as staff (200).
pub async fn put_work(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(mut input): JsonBody<PutWork>,
) -> AppResult<Response> {
    validate_input(&input)?;
    input.week_numbers.sort_unstable();
    let store = state.store()?;

    check_weeks_open(store, input.year, &input.week_numbers, user.is_staff).await?;

    match input.id.take() {
        None => create_work(&state, store, &user, input).await,
        Some(id) => update_work(&state, store, &user, &id, input).await,
    }
}

async fn create_work(
    state: &AppState,
    store: &Store,
    user: &AuthUser,
    input: PutWork,
) -> AppResult<Response> {
    let urls: Vec<&str> = input.items.iter().map(|i| i.url.as_str()).collect();
    let id = determine_short_id(&user.discord_id, &urls);

    let mut items = input.items;
    fill_thumbnails(state, &mut items).await;

    // Name lookup and insert share one writer-lock section.
    let guard = store.lock_writes().await;
    let artist = ArtistRepo::find(store, &user.discord_id)
        .await?
        .ok_or_else(|| {
            CoreError::Validation("Create an artist profile before submitting works".into())
        })?;

    let work = Work {
        id,
        year: input.year,
        week_numbers: input.week_numbers,
        artist_id: user.discord_id.clone(),
        artist_name: artist.name,
        title: input.title,
        medium: input.medium,
        description: input.description,
        items,
        is_approved: false,
        is_soft_deleted: None,
        submitted_timestamp: Utc::now(),
        discord_id: None,
    };

    if !WorkRepo::insert_new_locked(store, &guard, &work).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Work {} already exists",
            work.id
        ))));
    }
    drop(guard);

    tracing::info!(
        work_id = %work.id,
        artist_id = %work.artist_id,
        year = work.year,
        weeks = ?work.week_numbers,
        "Work submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: work })).into_response())
}

async fn update_work(
    state: &AppState,
    store: &Store,
    user: &AuthUser,
    id: &str,
    input: PutWork,
) -> AppResult<Response> {
    check_work_id(id)?;
    let existing = find_live_work(store, id).await?;
    if !user.may_act_for(&existing.artist_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the artist or staff may edit this work".into(),
        )));
    }

    let mut items = input.items;
    fill_thumbnails(state, &mut items).await;

    let guard = store.lock_writes().await;
    let artist_name = ArtistRepo::find(store, &existing.artist_id)
        .await?
        .map(|a| a.name);
    let updated = WorkRepo::modify_locked(store, &guard, id, |w| {
        w.year = input.year;
        w.week_numbers = input.week_numbers;
        w.title = input.title;
        w.medium = input.medium;
        w.description = input.description;
        w.items = items;
        if let Some(name) = artist_name {
            w.artist_name = name;
        }
    })
    .await?
    .ok_or_else(|| CoreError::not_found("Work", id))?;
    drop(guard);

    tracing::info!(
        work_id = %updated.id,
        user_id = %user.discord_id,
        year = updated.year,
        weeks = ?updated.week_numbers,
        "Work updated"
    );

    if updated.is_approved && updated.discord_id.is_some() && !updated.is_deleted() {
        announce::spawn_work_announcement(store.clone(), state.notifier.clone(), updated.clone());
    }

    Ok(Json(DataResponse { data: updated }).into_response())
}

/// DELETE /work?id=
///
/// Soft delete as the owner or staff. The record stays as a tombstone.
pub async fn delete_work(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<WorkIdParams>,
) -> AppResult<StatusCode> {
    check_work_id(&params.id)?;
    let store = state.store()?;

    let existing = find_live_work(store, &params.id).await?;
    if !user.may_act_for(&existing.artist_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the artist or staff may delete this work".into(),
        )));
    }

    WorkRepo::soft_delete(store, &params.id).await?;
    tracing::info!(work_id = %params.id, user_id = %user.discord_id, "Work deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn check_work_id(id: &str) -> Result<(), AppError> {
    if is_short_id(id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("'{id}' is not a valid work id")))
    }
}

/// A work that exists and is not soft-deleted, or 404.
pub(crate) async fn find_live_work(store: &Store, id: &str) -> AppResult<Work> {
    WorkRepo::find_by_id(store, id)
        .await?
        .filter(|w| !w.is_deleted())
        .ok_or_else(|| AppError::Core(CoreError::not_found("Work", id)))
}

/// Every week must exist; only staff may target unpublished weeks.
async fn check_weeks_open(
    store: &Store,
    year: i32,
    week_numbers: &[u32],
    is_staff: bool,
) -> Result<(), AppError> {
    let weeks = WeekRepo::list(store).await?;
    for n in week_numbers {
        match weeks.iter().find(|w| w.key() == (year, *n)) {
            None => {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Week {n} of {year} does not exist"
                ))))
            }
            Some(week) if !week.is_published && !is_staff => {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Week {n} of {year} is not open for submissions"
                ))))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Best-effort `og:image` lookup for items without a thumbnail.
async fn fill_thumbnails(state: &AppState, items: &mut [WorkItem]) {
    let Some(previews) = &state.previews else {
        return;
    };
    for item in items.iter_mut().filter(|i| i.thumbnail_url.is_none()) {
        item.thumbnail_url = previews.thumbnail_for(&item.url).await;
    }
}
