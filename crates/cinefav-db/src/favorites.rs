//! Favorites list persisted as one JSON blob under [`FAVORITES_KEY`].
//!
//! Every mutation is a whole-blob read-modify-write. The write is a
//! compare-and-set against the version that was read, and is retried
//! from a fresh read when another writer got there first.
#![allow(clippy::future_not_send)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::kv::{CasOutcome, LocalKvStore};

/// Storage key holding the favorites blob.
pub const FAVORITES_KEY: &str = "favorites";

/// Read-modify-write attempts before a mutation gives up.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// OMDb field names paired with the legacy spelling accepted on read.
const LEGACY_FIELDS: [(&str, &str); 6] = [
    ("imdbID", "id"),
    ("Title", "title"),
    ("Year", "year"),
    ("Poster", "poster"),
    ("Type", "type"),
    ("Plot", "description"),
];

/// A saved movie.
///
/// Field names match the OMDb payload so the blob stays readable by other
/// clients. `imdbID` is the identifier; older records keyed by `id` are
/// accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteMovie {
    /// IMDb identifier.
    #[serde(rename = "imdbID", alias = "id", deserialize_with = "deserialize_id")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title", alias = "title", default)]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year", alias = "year", default)]
    pub year: String,
    /// Poster image URL.
    #[serde(
        rename = "Poster",
        alias = "poster",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub poster: Option<String>,
    /// Record kind (`movie`, `series`, ...).
    #[serde(
        rename = "Type",
        alias = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub media_type: Option<String>,
    /// Plot text, present when saved from the detail screen.
    #[serde(
        rename = "Plot",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub plot: Option<String>,
}

/// One element of the stored array.
///
/// Records that do not decode are carried as raw JSON so a mutation writes
/// them back unchanged.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StoredRecord {
    /// A decoded favorite.
    Movie(FavoriteMovie),
    /// A record kept verbatim.
    Unreadable(Value),
}

impl StoredRecord {
    /// Returns whether this record is the favorite `imdb_id`.
    fn is(&self, imdb_id: &str) -> bool {
        matches!(self, Self::Movie(movie) if movie.imdb_id == imdb_id)
    }
}

/// Result of [`FavoritesStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The movie was appended.
    Added,
    /// A movie with the same identifier was already stored; nothing written.
    AlreadyPresent,
}

/// Result of [`FavoritesStore::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// At least one entry was removed.
    Removed,
    /// No entry matched; the list was written back unchanged.
    NotPresent,
}

/// Favorites list on top of a key-value store.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FavoritesStore<S> {
    /// Underlying store.
    store: S,
}

impl<S: LocalKvStore> FavoritesStore<S> {
    /// Creates a favorites store over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the stored list.
    ///
    /// Returns an empty list when nothing is stored yet, or when the blob
    /// cannot be read or is not a JSON array (logged at `warn`). Records
    /// that do not decode are left out.
    pub async fn load(&self) -> Vec<FavoriteMovie> {
        match self.read().await {
            Ok((records, _)) => records
                .into_iter()
                .filter_map(|record| match record {
                    StoredRecord::Movie(movie) => Some(movie),
                    StoredRecord::Unreadable(_) => None,
                })
                .collect(),
            Err(e) => {
                tracing::warn!("failed to load favorites: {e:#}");
                Vec::new()
            }
        }
    }

    /// Same as [`Self::load`]; the list rendered by the favorites screen.
    pub async fn list(&self) -> Vec<FavoriteMovie> {
        self.load().await
    }

    /// Returns whether a movie with `imdb_id` is stored.
    pub async fn contains(&self, imdb_id: &str) -> bool {
        self.load()
            .await
            .iter()
            .any(|movie| movie.imdb_id == imdb_id)
    }

    /// Appends `movie` unless its identifier is already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored blob cannot be read or decoded
    /// (nothing is written in that case), if the write fails, or if the
    /// list kept changing underneath for every attempt.
    #[instrument(skip_all, fields(imdb_id = %movie.imdb_id))]
    pub async fn add(&self, movie: FavoriteMovie) -> Result<AddOutcome> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let (mut records, version) = self.read().await?;
            if records.iter().any(|r| r.is(&movie.imdb_id)) {
                tracing::debug!("already in favorites");
                return Ok(AddOutcome::AlreadyPresent);
            }

            records.push(StoredRecord::Movie(movie.clone()));
            if self.write(&records, version).await? {
                tracing::debug!(count = records.len(), "added to favorites");
                return Ok(AddOutcome::Added);
            }
            tracing::debug!(attempt, "favorites changed during add, retrying");
        }

        bail!("favorites kept changing; gave up after {MAX_WRITE_ATTEMPTS} attempts")
    }

    /// Removes every entry with `imdb_id` and writes the list back.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored blob cannot be read or decoded
    /// (nothing is written in that case), if the write fails, or if the
    /// list kept changing underneath for every attempt.
    #[instrument(skip_all, fields(imdb_id = %imdb_id))]
    pub async fn remove(&self, imdb_id: &str) -> Result<RemoveOutcome> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let (records, version) = self.read().await?;
            let before = records.len();
            let kept: Vec<StoredRecord> = records.into_iter().filter(|r| !r.is(imdb_id)).collect();
            let outcome = if kept.len() < before {
                RemoveOutcome::Removed
            } else {
                RemoveOutcome::NotPresent
            };

            if self.write(&kept, version).await? {
                tracing::debug!(?outcome, count = kept.len(), "favorites written");
                return Ok(outcome);
            }
            tracing::debug!(attempt, "favorites changed during remove, retrying");
        }

        bail!("favorites kept changing; gave up after {MAX_WRITE_ATTEMPTS} attempts")
    }

    /// Reads and decodes the blob along with its version tag.
    async fn read(&self) -> Result<(Vec<StoredRecord>, Option<u64>)> {
        let entry = self
            .store
            .get(FAVORITES_KEY)
            .await
            .context("failed to read favorites")?;

        match entry {
            None => Ok((Vec::new(), None)),
            Some(entry) => {
                let records = decode_favorites(&entry.value)?;
                Ok((records, Some(entry.version)))
            }
        }
    }

    /// Writes the list if the stored version is still `expected`.
    ///
    /// Returns `false` on a version conflict.
    async fn write(&self, records: &[StoredRecord], expected: Option<u64>) -> Result<bool> {
        let blob = serde_json::to_string(records).context("failed to serialize favorites")?;
        let outcome = self
            .store
            .compare_and_set(FAVORITES_KEY, expected, &blob)
            .await
            .context("failed to write favorites")?;

        Ok(matches!(outcome, CasOutcome::Written { .. }))
    }
}

/// Decodes a favorites blob.
///
/// Fails only when the blob is not a JSON array. Elements are decoded one
/// by one via [`decode_record`].
fn decode_favorites(blob: &str) -> Result<Vec<StoredRecord>> {
    let raw: Vec<Value> = serde_json::from_str(blob).context("failed to decode favorites")?;
    Ok(raw.into_iter().map(decode_record).collect())
}

/// Decodes one stored record, keeping it verbatim when that fails.
///
/// When a record carries both the OMDb and the legacy spelling of a
/// field, the OMDb one is used.
fn decode_record(raw: Value) -> StoredRecord {
    let mut normalized = raw.clone();
    if let Some(fields) = normalized.as_object_mut() {
        for (name, legacy) in LEGACY_FIELDS {
            if fields.contains_key(name) {
                fields.remove(legacy);
            }
        }
    }

    match serde_json::from_value::<FavoriteMovie>(normalized) {
        Ok(movie) => StoredRecord::Movie(movie),
        Err(e) => {
            tracing::warn!("skipping unreadable favorites record {raw}: {e}");
            StoredRecord::Unreadable(raw)
        }
    }
}

/// Accepts both string and numeric identifiers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}
