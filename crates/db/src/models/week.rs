//! Challenge weeks.
//!
//! All weeks live in one aggregate document and are replaced together.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    #[validate(range(min = 2000, max = 2100, message = "must be between 2000 and 2100"))]
    pub year: i32,
    #[validate(range(min = 1, max = 16, message = "must be between 1 and 16"))]
    pub week: u32,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub theme: String,
    /// Staff-authored HTML/Markdown, served as-is.
    #[serde(default)]
    pub information: String,
    #[serde(default)]
    pub is_published: bool,
    /// Id of the Discord announcement message, once posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
}

impl Week {
    pub fn key(&self) -> (i32, u32) {
        (self.year, self.week)
    }

    /// Whether the announced content differs.
    pub fn announcement_differs(&self, other: &Week) -> bool {
        self.theme != other.theme || self.information != other.information
    }
}

/// Reject a week set that names the same `(year, week)` twice.
pub fn check_unique_weeks(weeks: &[Week]) -> Result<(), String> {
    for (i, week) in weeks.iter().enumerate() {
        if weeks[..i].iter().any(|w| w.key() == week.key()) {
            return Err(format!(
                "Week {} of {} is listed more than once",
                week.week, week.year
            ));
        }
    }
    Ok(())
}

/// Carry announcement ids from the stored weeks onto incoming weeks that do
/// not name one, so an edit never forgets an earlier Discord post.
pub fn carry_over_discord_ids(existing: &[Week], incoming: &mut [Week]) {
    for week in incoming.iter_mut().filter(|w| w.discord_id.is_none()) {
        week.discord_id = existing
            .iter()
            .find(|e| e.key() == week.key())
            .and_then(|e| e.discord_id.clone());
    }
}
