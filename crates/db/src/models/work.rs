//! Work records and request DTOs.

use artweeks_core::types::{DiscordId, Timestamp};
use artweeks_core::weeks::validate_week_numbers;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// One file (or link) of a work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[validate(url(message = "must be an http(s) URL"), custom(function = "check_http_scheme"))]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "must be an http(s) URL"))]
    pub thumbnail_url: Option<String>,
}

/// A submission, as stored under every work index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub year: i32,
    pub week_numbers: Vec<u32>,
    pub artist_id: DiscordId,
    /// Denormalized copy of the artist's display name.
    #[serde(default)]
    pub artist_name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default)]
    pub description: String,
    pub items: Vec<WorkItem>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_soft_deleted: Option<bool>,
    pub submitted_timestamp: Timestamp,
    /// Id of the Discord announcement message, once posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
}

impl Work {
    pub fn is_deleted(&self) -> bool {
        self.is_soft_deleted.unwrap_or(false)
    }

    /// Visible when not deleted and either approved, owned by the viewer,
    /// or viewed by staff.
    pub fn is_visible_to(&self, viewer: Option<&str>, is_staff: bool) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.is_approved || is_staff || viewer == Some(self.artist_id.as_str())
    }

    pub fn item_urls(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.url.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Body of `PUT /work`. Without `id` a new work is created.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PutWork {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(range(min = 2000, max = 2100, message = "must be between 2000 and 2100"))]
    pub year: i32,
    #[validate(custom(function = "check_week_numbers"))]
    pub week_numbers: Vec<u32>,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub medium: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<WorkItem>,
}

/// Body of `POST /approve`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveWork {
    pub id: String,
    #[serde(default = "default_true")]
    pub is_approved: bool,
}

fn default_true() -> bool {
    true
}

/// Query of `GET /works`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkListParams {
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub week: Option<u32>,
}

/// Query of `GET /work` and `DELETE /work`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkIdParams {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Custom validators
// ---------------------------------------------------------------------------

fn check_week_numbers(weeks: &[u32]) -> Result<(), ValidationError> {
    validate_week_numbers(weeks)
        .map_err(|msg| ValidationError::new("week_numbers").with_message(msg.into()))
}

fn check_http_scheme(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::new("scheme").with_message("must be an http(s) URL".into()))
    }
}
