//! Repository for artist profiles (`artists/all`, `artists/by-name/*`).

use std::collections::{BTreeMap, HashMap};

use artweeks_core::types::DiscordId;

use super::WorkRepo;
use crate::keys;
use crate::kv::KvError;
use crate::models::artist::Artist;
use crate::store::Store;

type ArtistMap = BTreeMap<DiscordId, Artist>;

/// Result of [`ArtistRepo::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArtistSave {
    Saved {
        artist: Artist,
        /// Works whose denormalized name was rewritten.
        renamed_works: usize,
    },
    /// Another artist already uses the requested name.
    NameTaken { holder: DiscordId },
}

/// Provides reads and the rename-aware upsert for artists.
pub struct ArtistRepo;

impl ArtistRepo {
    /// All artists sorted by name, with `works_count` filled in.
    pub async fn list(store: &Store) -> Result<Vec<Artist>, KvError> {
        let artists = read_artists(store).await?;
        let counts = works_per_artist(store).await?;

        let mut list: Vec<Artist> = artists
            .into_values()
            .map(|mut a| {
                a.works_count = Some(counts.get(&a.discord_id).copied().unwrap_or(0));
                a
            })
            .collect();
        list.sort_by_key(|a| keys::normalize_name(&a.name));
        Ok(list)
    }

    /// One artist by Discord id, with `works_count` filled in.
    pub async fn find(store: &Store, discord_id: &str) -> Result<Option<Artist>, KvError> {
        let Some(mut artist) = read_artists(store).await?.remove(discord_id) else {
            return Ok(None);
        };
        let count = WorkRepo::list_by_artist(store, discord_id).await?.len();
        artist.works_count = Some(count);
        Ok(Some(artist))
    }

    /// Look an artist up through the case-insensitive name index.
    pub async fn find_by_name(store: &Store, name: &str) -> Result<Option<Artist>, KvError> {
        match store.get_json::<DiscordId>(&keys::artist_by_name(name)).await? {
            Some(discord_id) => Self::find(store, &discord_id).await,
            None => Ok(None),
        }
    }

    /// Insert or update a profile.
    ///
    /// On a name change: check uniqueness, rewrite the denormalized name on
    /// the artist's works, move the by-name index entry, then write the
    /// profile. The steps are separate writes under the writer lock.
    pub async fn save(store: &Store, mut artist: Artist) -> Result<ArtistSave, KvError> {
        let guard = store.lock_writes().await;
        artist.name = artist.name.trim().to_string();
        artist.works_count = None;

        let mut artists = read_artists(store).await?;
        let previous = artists.get(&artist.discord_id).cloned();
        let new_key = keys::artist_by_name(&artist.name);

        if let Some(holder) = store.get_json::<DiscordId>(&new_key).await? {
            if holder != artist.discord_id {
                return Ok(ArtistSave::NameTaken { holder });
            }
        }
        let wanted = keys::normalize_name(&artist.name);
        if let Some(other) = artists
            .values()
            .find(|a| a.discord_id != artist.discord_id && keys::normalize_name(&a.name) == wanted)
        {
            return Ok(ArtistSave::NameTaken {
                holder: other.discord_id.clone(),
            });
        }

        let mut renamed_works = 0;
        if let Some(prev) = previous.as_ref().filter(|p| p.name != artist.name) {
            renamed_works =
                WorkRepo::rename_artist_locked(store, &guard, &artist.discord_id, &artist.name)
                    .await?;

            let old_key = keys::artist_by_name(&prev.name);
            store.put_json(&new_key, &artist.discord_id).await?;
            if old_key != new_key {
                store.delete(&old_key).await?;
            }
            tracing::info!(
                artist_id = %artist.discord_id,
                old_name = %prev.name,
                new_name = %artist.name,
                renamed_works,
                "Artist renamed"
            );
        } else if previous.is_none() {
            store.put_json(&new_key, &artist.discord_id).await?;
        }

        artists.insert(artist.discord_id.clone(), artist.clone());
        store.put_json(keys::ARTISTS_ALL, &artists).await?;

        Ok(ArtistSave::Saved {
            artist,
            renamed_works,
        })
    }
}

async fn read_artists(store: &Store) -> Result<ArtistMap, KvError> {
    Ok(store.get_json::<ArtistMap>(keys::ARTISTS_ALL).await?.unwrap_or_default())
}

async fn works_per_artist(store: &Store) -> Result<HashMap<DiscordId, usize>, KvError> {
    let mut counts = HashMap::new();
    for work in WorkRepo::list_all(store).await? {
        *counts.entry(work.artist_id).or_insert(0) += 1;
    }
    Ok(counts)
}
