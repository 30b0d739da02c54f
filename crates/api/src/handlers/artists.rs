//! Handlers for artist profiles.

use artweeks_core::error::CoreError;
use artweeks_core::validation::validate_input;
use artweeks_db::models::artist::{Artist, ArtistListParams, PutArtist};
use artweeks_db::repositories::{ArtistRepo, ArtistSave};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /artists
///
/// All artists sorted by name, each with `worksCount`. With `?discordId=`
/// or `?name=` (case-insensitive) a single artist is returned, or 404.
pub async fn list_artists(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ArtistListParams>,
) -> AppResult<Response> {
    let store = state.store()?;

    if let Some(discord_id) = params.discord_id {
        let artist = ArtistRepo::find(store, &discord_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Artist", &discord_id))?;
        return Ok(Json(DataResponse { data: artist }).into_response());
    }
    if let Some(name) = params.name {
        let artist = ArtistRepo::find_by_name(store, &name)
            .await?
            .ok_or_else(|| CoreError::not_found("Artist", &name))?;
        return Ok(Json(DataResponse { data: artist }).into_response());
    }

    let artists = ArtistRepo::list(store).await?;
    Ok(Json(DataResponse { data: artists }).into_response())
}

/// PUT /artist
///
/// Create or update the caller's profile. Staff may name another
/// `discordId`. A name change is propagated to every work of the artist.
pub async fn put_artist(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<PutArtist>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    let store = state.store()?;

    let discord_id = input
        .discord_id
        .unwrap_or_else(|| user.discord_id.clone());
    if !user.may_act_for(&discord_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only staff may edit another artist's profile".into(),
        )));
    }

    let artist = Artist {
        discord_id,
        name: input.name,
        thumbnail_url: input.thumbnail_url.unwrap_or_default(),
        socials: input.socials,
        works_count: None,
    };

    match ArtistRepo::save(store, artist).await? {
        ArtistSave::Saved {
            artist,
            renamed_works,
        } => {
            tracing::info!(
                artist_id = %artist.discord_id,
                user_id = %user.discord_id,
                renamed_works,
                "Artist profile saved"
            );
            Ok(Json(DataResponse { data: artist }))
        }
        ArtistSave::NameTaken { holder } => {
            tracing::debug!(holder = %holder, "Artist name already taken");
            Err(AppError::Core(CoreError::Conflict(
                "That name is already taken by another artist".into(),
            )))
        }
    }
}
