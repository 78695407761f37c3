//! Detail screen state.
//!
//! Opens with whatever summary the caller already has, then upgrades to the
//! full record once the detail lookup succeeds. A failed lookup keeps the
//! summary on screen.
#![allow(clippy::future_not_send)]

use anyhow::Result;
use cinefav_api::omdb::{DetailParams, LocalOmdbApi, MovieDetail, PlotLength};
use cinefav_db::{AddOutcome, FavoriteMovie, FavoritesStore, LocalKvStore};

/// Acknowledgement shown after a favorites change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Popup title.
    pub title: String,
    /// Popup body.
    pub body: String,
}

impl Notice {
    fn new(title: &str, body: String) -> Self {
        Self {
            title: String::from(title),
            body,
        }
    }
}

/// Builds the stored favorites record for `movie`.
#[must_use]
pub fn favorite_from_detail(movie: &MovieDetail) -> FavoriteMovie {
    FavoriteMovie {
        imdb_id: movie.imdb_id.clone(),
        title: movie.title.clone(),
        year: movie.year.clone(),
        poster: movie.poster.clone(),
        media_type: Some(String::from(movie.media_type.as_str())),
        plot: movie.plot.clone(),
    }
}

/// State for the detail screen.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DetailViewModel {
    /// Record on display.
    movie: MovieDetail,
    /// Whether the record is in the favorites list.
    is_favorite: bool,
    /// Whether the full record has been loaded.
    loaded: bool,
}

impl DetailViewModel {
    /// Opens the screen with a summary (or an already complete record).
    pub fn new(movie: impl Into<MovieDetail>) -> Self {
        Self {
            movie: movie.into(),
            is_favorite: false,
            loaded: false,
        }
    }

    /// Returns the record on display.
    #[must_use]
    pub const fn movie(&self) -> &MovieDetail {
        &self.movie
    }

    /// Returns whether the record is in the favorites list.
    #[must_use]
    pub const fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    /// Returns whether the full record has replaced the summary.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Parameters for the full-plot detail lookup.
    #[must_use]
    pub fn detail_params(&self) -> DetailParams {
        DetailParams::new(self.movie.imdb_id.clone()).plot(PlotLength::Full)
    }

    /// Applies a detail lookup result.
    ///
    /// On failure, or when the response is for another record, the current
    /// fields are kept and the problem is logged.
    pub fn apply_detail(&mut self, result: Result<MovieDetail>) {
        match result {
            Ok(detail) if detail.imdb_id == self.movie.imdb_id => {
                self.movie = detail;
                self.loaded = true;
            }
            Ok(detail) => {
                tracing::warn!(
                    expected = %self.movie.imdb_id,
                    received = %detail.imdb_id,
                    "detail response for another record ignored"
                );
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load details for {}: {e:#}",
                    self.movie.imdb_id
                );
            }
        }
    }

    /// Fetches the full record and applies it.
    pub async fn refresh<A: LocalOmdbApi>(&mut self, api: &A) {
        let result = api.details(&self.detail_params()).await;
        self.apply_detail(result);
    }

    /// Re-reads the favorite flag from the store.
    pub async fn sync_favorite<S: LocalKvStore>(&mut self, favorites: &FavoritesStore<S>) {
        self.is_favorite = favorites.contains(&self.movie.imdb_id).await;
    }

    /// Adds or removes the record depending on the current flag.
    ///
    /// Returns the acknowledgement to show, or `None` when the write failed
    /// (logged at `warn`, flag unchanged).
    pub async fn toggle_favorite<S: LocalKvStore>(
        &mut self,
        favorites: &FavoritesStore<S>,
    ) -> Option<Notice> {
        let title = self.movie.title.clone();

        if self.is_favorite {
            return match favorites.remove(&self.movie.imdb_id).await {
                Ok(_) => {
                    self.is_favorite = false;
                    Some(Notice::new(
                        "Removed from Favorites",
                        format!("{title} has been removed."),
                    ))
                }
                Err(e) => {
                    tracing::warn!("failed to remove {title} from favorites: {e:#}");
                    None
                }
            };
        }

        match favorites.add(favorite_from_detail(&self.movie)).await {
            Ok(AddOutcome::Added) => {
                self.is_favorite = true;
                Some(Notice::new(
                    "Added to Favorites",
                    format!("{title} has been added."),
                ))
            }
            Ok(AddOutcome::AlreadyPresent) => {
                self.is_favorite = true;
                Some(Notice::new(
                    "Already in Favorites",
                    format!("{title} is already in your favorites."),
                ))
            }
            Err(e) => {
                tracing::warn!("failed to add {title} to favorites: {e:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use anyhow::anyhow;
    use cinefav_api::omdb::{MediaType, MovieSummary};
    use cinefav_db::MemoryKvStore;

    use super::*;

    fn batman_summary() -> MovieSummary {
        MovieSummary {
            imdb_id: String::from("tt0372784"),
            title: String::from("Batman Begins"),
            year: String::from("2005"),
            poster: Some(String::from("https://example.com/poster.jpg")),
            media_type: MediaType::Movie,
        }
    }

    fn batman_detail() -> MovieDetail {
        let mut detail = MovieDetail::from(batman_summary());
        detail.plot = Some(String::from("After witnessing his parents' death, Bruce Wayne..."));
        detail.director = Some(String::from("Christopher Nolan"));
        detail
    }

    #[test]
    fn test_failed_lookup_keeps_summary() {
        // Arrange
        let mut vm = DetailViewModel::new(batman_summary());

        // Act
        vm.apply_detail(Err(anyhow!("OMDb API error (HTTP 500): boom")));

        // Assert
        assert!(!vm.is_loaded());
        assert_eq!(vm.movie().title, "Batman Begins");
        assert_eq!(vm.movie().year, "2005");
        assert!(vm.movie().plot.is_none());
    }

    #[test]
    fn test_successful_lookup_replaces_summary() {
        // Arrange
        let mut vm = DetailViewModel::new(batman_summary());

        // Act
        vm.apply_detail(Ok(batman_detail()));

        // Assert
        assert!(vm.is_loaded());
        assert_eq!(vm.movie().director.as_deref(), Some("Christopher Nolan"));
    }

    #[test]
    fn test_response_for_other_record_is_ignored() {
        // Arrange
        let mut vm = DetailViewModel::new(batman_summary());
        let mut other = batman_detail();
        other.imdb_id = String::from("tt0468569");

        // Act
        vm.apply_detail(Ok(other));

        // Assert
        assert!(!vm.is_loaded());
        assert_eq!(vm.movie().imdb_id, "tt0372784");
    }

    #[test]
    fn test_detail_params_request_full_plot() {
        // Arrange
        let vm = DetailViewModel::new(batman_summary());

        // Act
        let params = vm.detail_params();

        // Assert
        assert_eq!(params.imdb_id, "tt0372784");
        assert_eq!(params.plot, PlotLength::Full);
    }

    #[test]
    fn test_favorite_record_carries_detail_fields() {
        // Arrange
        let detail = batman_detail();

        // Act
        let favorite = favorite_from_detail(&detail);

        // Assert
        assert_eq!(favorite.imdb_id, "tt0372784");
        assert_eq!(favorite.media_type.as_deref(), Some("movie"));
        assert!(favorite.plot.unwrap().contains("Bruce Wayne"));
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        // Arrange
        let favorites = FavoritesStore::new(MemoryKvStore::new());
        let mut vm = DetailViewModel::new(batman_detail());
        vm.sync_favorite(&favorites).await;
        assert!(!vm.is_favorite());

        // Act
        let added = vm.toggle_favorite(&favorites).await.unwrap();
        let stored_after_add = favorites.list().await;
        let removed = vm.toggle_favorite(&favorites).await.unwrap();

        // Assert
        assert_eq!(added.title, "Added to Favorites");
        assert_eq!(added.body, "Batman Begins has been added.");
        assert_eq!(stored_after_add.len(), 1);
        assert_eq!(removed.title, "Removed from Favorites");
        assert!(!vm.is_favorite());
        assert!(favorites.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_flag_reports_already_present() {
        // Arrange: another screen saved the movie after this one synced
        let favorites = FavoritesStore::new(MemoryKvStore::new());
        let mut vm = DetailViewModel::new(batman_detail());
        vm.sync_favorite(&favorites).await;
        favorites
            .add(favorite_from_detail(&batman_detail()))
            .await
            .unwrap();

        // Act
        let notice = vm.toggle_favorite(&favorites).await.unwrap();

        // Assert
        assert_eq!(notice.title, "Already in Favorites");
        assert!(vm.is_favorite());
        assert_eq!(favorites.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sync_favorite_reflects_store() {
        // Arrange
        let favorites = FavoritesStore::new(MemoryKvStore::new());
        favorites
            .add(favorite_from_detail(&batman_detail()))
            .await
            .unwrap();
        let mut vm = DetailViewModel::new(batman_summary());

        // Act
        vm.sync_favorite(&favorites).await;

        // Assert
        assert!(vm.is_favorite());
    }
}
