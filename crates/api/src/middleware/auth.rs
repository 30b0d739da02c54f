//! Bearer-token identity extractors for Axum handlers.

use std::convert::Infallible;

use artweeks_core::error::CoreError;
use artweeks_core::identity::discord_id_from_subject;
use artweeks_core::types::DiscordId;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Whoever is calling, possibly nobody.
///
/// Never rejects: missing, malformed, expired, or wrongly-signed tokens all
/// resolve to an anonymous caller (logged at `warn`). The result is cached in
/// the request extensions so stacked extractors verify the token once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caller {
    pub discord_id: Option<DiscordId>,
    pub is_staff: bool,
}

impl Caller {
    pub fn id(&self) -> Option<&str> {
        self.discord_id.as_deref()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(caller.clone());
        }
        let caller = resolve_caller(parts, state).await;
        parts.extensions.insert(caller.clone());
        Ok(caller)
    }
}

async fn resolve_caller(parts: &Parts, state: &AppState) -> Caller {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Caller::default();
    };
    let Some(token) = header.to_str().ok().and_then(bearer_token) else {
        tracing::warn!("Malformed Authorization header, treating caller as anonymous");
        return Caller::default();
    };
    let Some(verifier) = &state.verifier else {
        tracing::warn!("Bearer token presented but authentication is not configured");
        return Caller::default();
    };

    let claims = match verifier.verify(token).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token, treating caller as anonymous");
            return Caller::default();
        }
    };
    match discord_id_from_subject(&claims.sub) {
        Some(discord_id) => Caller {
            is_staff: state.config.is_staff(&discord_id),
            discord_id: Some(discord_id),
        },
        None => {
            tracing::warn!(subject = %claims.sub, "Token subject carries no numeric id");
            Caller::default()
        }
    }
}

/// Token of an `Authorization` value. The scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authenticated caller. Rejects anonymous requests with 401.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(artist_id = %user.discord_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub discord_id: DiscordId,
    pub is_staff: bool,
}

impl AuthUser {
    /// Owner of `artist_id`, or staff.
    pub fn may_act_for(&self, artist_id: &str) -> bool {
        self.is_staff || self.discord_id == artist_id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = match Caller::from_request_parts(parts, state).await {
            Ok(caller) => caller,
            Err(never) => match never {},
        };
        match caller.discord_id {
            Some(discord_id) => Ok(AuthUser {
                discord_id,
                is_staff: caller.is_staff,
            }),
            None => Err(AppError::Core(CoreError::Unauthorized(
                "A valid bearer token is required".into(),
            ))),
        }
    }
}
