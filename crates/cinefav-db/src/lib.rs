//! Local storage for cinefav.
//!
//! Uses `rusqlite` (bundled `SQLite`) as a versioned key-value store and
//! keeps the favorites list as one JSON blob inside it.

mod connection;
/// Favorites list stored under a single key.
pub mod favorites;
/// Versioned key-value store.
pub mod kv;
mod migrations;

pub use connection::open_db;
pub use favorites::{AddOutcome, FAVORITES_KEY, FavoriteMovie, FavoritesStore, RemoveOutcome};
pub use kv::{CasOutcome, KvStore, LocalKvStore, MemoryKvStore, SqliteKvStore, VersionedValue};
