//! Artist profiles and request DTOs.

use artweeks_core::types::DiscordId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// An artist profile, keyed by Discord id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub discord_id: DiscordId,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub socials: Vec<String>,
    /// Computed on read; never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub works_count: Option<usize>,
}

/// Body of `PUT /artist`.
///
/// `discord_id` defaults to the caller; only staff may name someone else.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PutArtist {
    #[serde(default)]
    pub discord_id: Option<String>,
    #[validate(custom(function = "check_name"))]
    pub name: String,
    #[serde(default)]
    #[validate(url(message = "must be a URL"))]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10, message = "at most 10 social links"), custom(function = "check_socials"))]
    pub socials: Vec<String>,
}

/// Query of `GET /artists`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistListParams {
    pub discord_id: Option<String>,
    pub name: Option<String>,
}

/// Maximum display-name length in characters.
pub const MAX_NAME_CHARS: usize = 64;

fn check_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::new("name")
            .with_message(format!("must be 1 to {MAX_NAME_CHARS} characters").into()));
    }
    if trimmed.contains('/') {
        return Err(ValidationError::new("name").with_message("must not contain '/'".into()));
    }
    Ok(())
}

fn check_socials(socials: &[String]) -> Result<(), ValidationError> {
    match socials
        .iter()
        .find(|s| !(s.starts_with("https://") || s.starts_with("http://")))
    {
        Some(bad) => Err(ValidationError::new("socials")
            .with_message(format!("'{bad}' is not an http(s) URL").into())),
        None => Ok(()),
    }
}
