//! Repository for the `weeks` aggregate document.

use crate::keys;
use crate::kv::KvError;
use crate::models::week::Week;
use crate::store::{Store, WriteGuard};

/// Reads and whole-document writes for challenge weeks.
pub struct WeekRepo;

impl WeekRepo {
    /// Every week, sorted by `(year, week)`.
    pub async fn list(store: &Store) -> Result<Vec<Week>, KvError> {
        let mut weeks = store.get_json::<Vec<Week>>(keys::WEEKS).await?.unwrap_or_default();
        weeks.sort_by_key(Week::key);
        Ok(weeks)
    }

    /// Only the weeks with `is_published` set.
    pub async fn list_published(store: &Store) -> Result<Vec<Week>, KvError> {
        let mut weeks = Self::list(store).await?;
        weeks.retain(|w| w.is_published);
        Ok(weeks)
    }

    pub async fn find(store: &Store, year: i32, week: u32) -> Result<Option<Week>, KvError> {
        Ok(Self::list(store)
            .await?
            .into_iter()
            .find(|w| w.key() == (year, week)))
    }

    /// Replace the whole aggregate. Returns the stored (sorted) weeks.
    pub async fn replace_all_locked(
        store: &Store,
        _guard: &WriteGuard<'_>,
        mut weeks: Vec<Week>,
    ) -> Result<Vec<Week>, KvError> {
        weeks.sort_by_key(Week::key);
        store.put_json(keys::WEEKS, &weeks).await?;
        tracing::info!(count = weeks.len(), "Weeks replaced");
        Ok(weeks)
    }

    /// Record the announcement message id of one week.
    ///
    /// Returns `false` when the week no longer exists.
    pub async fn set_discord_id(
        store: &Store,
        year: i32,
        week: u32,
        discord_id: &str,
    ) -> Result<bool, KvError> {
        let _guard = store.lock_writes().await;
        let mut weeks = Self::list(store).await?;
        let Some(target) = weeks.iter_mut().find(|w| w.key() == (year, week)) else {
            return Ok(false);
        };
        target.discord_id = Some(discord_id.to_string());
        store.put_json(keys::WEEKS, &weeks).await?;
        Ok(true)
    }
}
