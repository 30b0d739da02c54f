//! Repository for works and their denormalized indexes.
//!
//! `works/by-id/{id}` is the authoritative record. The by-artist, by-week,
//! and flat-list documents are derived copies maintained by [`WorkRepo::place`]
//! and rebuilt from scratch by [`WorkRepo::reindex`].
//!
//! Every multi-key mutation runs under the store's writer lock. A missing
//! index document reads as empty; a failed read aborts the remaining steps
//! of the fan-out instead of writing back an index that looks empty.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::keys;
use crate::kv::KvError;
use crate::models::work::Work;
use crate::store::{Store, WriteGuard};

/// Index document shape for the by-artist and by-week indexes.
type WorkMap = BTreeMap<String, Work>;

/// Outcome of a full index rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexReport {
    /// Authoritative records scanned (including soft-deleted ones).
    pub works: usize,
    /// Non-deleted works written to the derived indexes.
    pub listed: usize,
    pub artist_indexes: usize,
    pub week_indexes: usize,
    /// Index documents that no longer had any works and were removed.
    pub stale_indexes_removed: usize,
}

/// Provides reads and fan-out writes for works.
pub struct WorkRepo;

impl WorkRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<Work>, KvError> {
        store.get_json(&keys::work_by_id(id)).await
    }

    pub async fn list_by_artist(store: &Store, artist_id: &str) -> Result<Vec<Work>, KvError> {
        let map = read_map(store, &keys::works_by_artist(artist_id)).await?;
        Ok(map.into_values().collect())
    }

    pub async fn list_by_week(store: &Store, year: i32, week: u32) -> Result<Vec<Work>, KvError> {
        let map = read_map(store, &keys::works_by_year_week(year, week)).await?;
        Ok(map.into_values().collect())
    }

    pub async fn list_all(store: &Store) -> Result<Vec<Work>, KvError> {
        read_list(store).await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write `work` into all four indexes.
    pub async fn place(store: &Store, work: &Work) -> Result<(), KvError> {
        let guard = store.lock_writes().await;
        Self::place_locked(store, &guard, work).await
    }

    /// [`place`](Self::place) for callers already holding the writer lock.
    ///
    /// Compares against the stored record so that weeks (or an artist) the
    /// work no longer belongs to are pruned. A soft-deleted work is removed
    /// from every derived index and kept only under its by-id key.
    pub async fn place_locked(
        store: &Store,
        _guard: &WriteGuard<'_>,
        work: &Work,
    ) -> Result<(), KvError> {
        let previous: Option<Work> = store.get_json(&keys::work_by_id(&work.id)).await?;
        let listed = !work.is_deleted();

        store.put_json(&keys::work_by_id(&work.id), work).await?;

        if let Some(prev) = previous.as_ref().filter(|p| p.artist_id != work.artist_id) {
            remove_from_map(store, &keys::works_by_artist(&prev.artist_id), &work.id).await?;
        }
        merge_into_map(store, &keys::works_by_artist(&work.artist_id), work, listed).await?;

        let current: BTreeSet<(i32, u32)> =
            work.week_numbers.iter().map(|w| (work.year, *w)).collect();
        if let Some(prev) = &previous {
            let dropped = prev
                .week_numbers
                .iter()
                .map(|w| (prev.year, *w))
                .filter(|slot| !current.contains(slot));
            for (year, week) in dropped {
                remove_from_map(store, &keys::works_by_year_week(year, week), &work.id).await?;
            }
        }
        for (year, week) in &current {
            merge_into_map(store, &keys::works_by_year_week(*year, *week), work, listed).await?;
        }

        merge_into_list(store, work, listed).await?;

        tracing::debug!(
            work_id = %work.id,
            artist_id = %work.artist_id,
            year = work.year,
            weeks = ?work.week_numbers,
            listed,
            "Work placed in indexes"
        );
        Ok(())
    }

    /// Place a new work unless its id is already taken (live or tombstoned).
    ///
    /// Returns `false` without writing anything on a collision.
    pub async fn insert_new_locked(
        store: &Store,
        guard: &WriteGuard<'_>,
        work: &Work,
    ) -> Result<bool, KvError> {
        if Self::find_by_id(store, &work.id).await?.is_some() {
            return Ok(false);
        }
        Self::place_locked(store, guard, work).await?;
        Ok(true)
    }

    /// Read-modify-write one work under the writer lock.
    ///
    /// Returns `None` when the work does not exist.
    pub async fn modify<F>(store: &Store, id: &str, f: F) -> Result<Option<Work>, KvError>
    where
        F: FnOnce(&mut Work),
    {
        let guard = store.lock_writes().await;
        Self::modify_locked(store, &guard, id, f).await
    }

    /// [`modify`](Self::modify) for callers already holding the writer lock.
    pub async fn modify_locked<F>(
        store: &Store,
        guard: &WriteGuard<'_>,
        id: &str,
        f: F,
    ) -> Result<Option<Work>, KvError>
    where
        F: FnOnce(&mut Work),
    {
        let Some(mut work) = Self::find_by_id(store, id).await? else {
            return Ok(None);
        };
        f(&mut work);
        Self::place_locked(store, guard, &work).await?;
        Ok(Some(work))
    }

    pub async fn set_approval(
        store: &Store,
        id: &str,
        approved: bool,
    ) -> Result<Option<Work>, KvError> {
        Self::modify(store, id, |w| w.is_approved = approved).await
    }

    pub async fn set_discord_id(
        store: &Store,
        id: &str,
        discord_id: &str,
    ) -> Result<Option<Work>, KvError> {
        Self::modify(store, id, |w| w.discord_id = Some(discord_id.to_string())).await
    }

    /// Mark a work deleted. The by-id record stays as a tombstone.
    pub async fn soft_delete(store: &Store, id: &str) -> Result<Option<Work>, KvError> {
        Self::modify(store, id, |w| w.is_soft_deleted = Some(true)).await
    }

    /// Rewrite the denormalized artist name on every listed work of an artist.
    ///
    /// Returns how many works were rewritten.
    pub async fn rename_artist_locked(
        store: &Store,
        guard: &WriteGuard<'_>,
        artist_id: &str,
        new_name: &str,
    ) -> Result<usize, KvError> {
        let works = Self::list_by_artist(store, artist_id).await?;
        let mut renamed = 0;
        for mut work in works.into_iter().filter(|w| w.artist_name != new_name) {
            work.artist_name = new_name.to_string();
            Self::place_locked(store, guard, &work).await?;
            renamed += 1;
        }
        Ok(renamed)
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Rebuild every derived index from the by-id records.
    ///
    /// Repairs divergence left by interrupted fan-outs or by writers in
    /// other processes. Index documents with no remaining works are deleted.
    pub async fn reindex(store: &Store) -> Result<ReindexReport, KvError> {
        let _guard = store.lock_writes().await;
        let mut report = ReindexReport::default();

        let mut by_artist: BTreeMap<String, WorkMap> = BTreeMap::new();
        let mut by_week: BTreeMap<(i32, u32), WorkMap> = BTreeMap::new();
        let mut all: Vec<Work> = Vec::new();

        for key in store.list_keys(keys::WORKS_BY_ID_PREFIX).await? {
            let Some(work) = store.get_json::<Work>(&key).await? else {
                continue;
            };
            report.works += 1;
            if work.is_deleted() {
                continue;
            }
            by_artist
                .entry(work.artist_id.clone())
                .or_default()
                .insert(work.id.clone(), work.clone());
            for week in &work.week_numbers {
                by_week
                    .entry((work.year, *week))
                    .or_default()
                    .insert(work.id.clone(), work.clone());
            }
            all.push(work);
        }
        all.sort_by(|a, b| {
            a.submitted_timestamp
                .cmp(&b.submitted_timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        report.listed = all.len();

        let mut written: BTreeSet<String> = BTreeSet::new();
        for (artist_id, map) in &by_artist {
            let key = keys::works_by_artist(artist_id);
            store.put_json(&key, map).await?;
            written.insert(key);
        }
        for ((year, week), map) in &by_week {
            let key = keys::works_by_year_week(*year, *week);
            store.put_json(&key, map).await?;
            written.insert(key);
        }
        store.put_json(keys::WORKS_ALL, &all).await?;
        report.artist_indexes = by_artist.len();
        report.week_indexes = by_week.len();

        for prefix in [keys::WORKS_BY_ARTIST_PREFIX, keys::WORKS_BY_YEAR_WEEK_PREFIX] {
            for key in store.list_keys(prefix).await? {
                if !written.contains(&key) {
                    store.delete(&key).await?;
                    report.stale_indexes_removed += 1;
                }
            }
        }

        tracing::info!(
            works = report.works,
            listed = report.listed,
            artist_indexes = report.artist_indexes,
            week_indexes = report.week_indexes,
            stale = report.stale_indexes_removed,
            "Work indexes rebuilt"
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Index document helpers
// ---------------------------------------------------------------------------

async fn read_map(store: &Store, key: &str) -> Result<WorkMap, KvError> {
    Ok(store.get_json::<WorkMap>(key).await?.unwrap_or_default())
}

async fn read_list(store: &Store) -> Result<Vec<Work>, KvError> {
    Ok(store.get_json::<Vec<Work>>(keys::WORKS_ALL).await?.unwrap_or_default())
}

/// Insert (or, when `listed` is false, remove) `work` in a map document.
async fn merge_into_map(store: &Store, key: &str, work: &Work, listed: bool) -> Result<(), KvError> {
    if !listed {
        return remove_from_map(store, key, &work.id).await;
    }
    let mut map = read_map(store, key).await?;
    map.insert(work.id.clone(), work.clone());
    store.put_json(key, &map).await
}

async fn remove_from_map(store: &Store, key: &str, id: &str) -> Result<(), KvError> {
    let mut map = read_map(store, key).await?;
    if map.remove(id).is_none() {
        return Ok(());
    }
    if map.is_empty() {
        store.delete(key).await
    } else {
        store.put_json(key, &map).await
    }
}

/// Replace in place (keeping list order), append, or remove from `works/all`.
async fn merge_into_list(store: &Store, work: &Work, listed: bool) -> Result<(), KvError> {
    let mut all = read_list(store).await?;
    let position = all.iter().position(|w| w.id == work.id);
    match (position, listed) {
        (Some(i), true) => all[i] = work.clone(),
        (None, true) => all.push(work.clone()),
        (Some(i), false) => {
            all.remove(i);
        }
        (None, false) => return Ok(()),
    }
    store.put_json(keys::WORKS_ALL, &all).await
}
