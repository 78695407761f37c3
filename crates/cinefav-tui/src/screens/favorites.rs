//! Favorites screen state.
#![allow(clippy::future_not_send)]

use cinefav_api::omdb::{MediaType, MovieDetail, MovieSummary};
use cinefav_db::{FavoriteMovie, FavoritesStore, LocalKvStore};
use ratatui::widgets::ListState;

/// Builds the record the detail screen opens with for a saved movie.
#[must_use]
pub fn detail_from_favorite(favorite: &FavoriteMovie) -> MovieDetail {
    let mut detail = MovieDetail::from(MovieSummary {
        imdb_id: favorite.imdb_id.clone(),
        title: favorite.title.clone(),
        year: favorite.year.clone(),
        poster: favorite.poster.clone(),
        media_type: favorite
            .media_type
            .as_deref()
            .map_or_else(MediaType::default, MediaType::from),
    });
    detail.plot.clone_from(&favorite.plot);
    detail
}

/// State for the favorites screen.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct FavoritesViewModel {
    /// Entries as of the last reload.
    entries: Vec<FavoriteMovie>,
    /// List selection.
    pub list_state: ListState,
}

impl FavoritesViewModel {
    /// Creates an empty favorites screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries as of the last reload.
    #[must_use]
    pub fn entries(&self) -> &[FavoriteMovie] {
        &self.entries
    }

    /// Re-reads the list from the store, keeping the selection in range.
    pub async fn reload<S: LocalKvStore>(&mut self, favorites: &FavoritesStore<S>) {
        self.entries = favorites.list().await;
        let selected = match (self.list_state.selected(), self.entries.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(idx), len) => Some(idx.min(len.saturating_sub(1))),
        };
        self.list_state.select(selected);
    }

    /// Returns the selected entry.
    #[must_use]
    pub fn selected(&self) -> Option<&FavoriteMovie> {
        self.list_state
            .selected()
            .and_then(|idx| self.entries.get(idx))
    }

    /// Moves the selection up.
    pub fn move_up(&mut self) {
        if let Some(current) = self.list_state.selected() {
            self.list_state.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves the selection down.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_down(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let next = self
            .list_state
            .selected()
            .map_or(0, |current| (current + 1).min(self.entries.len() - 1));
        self.list_state.select(Some(next));
    }
}
