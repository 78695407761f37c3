//! End-to-end screen flows against a mock OMDb server.
#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::time::Duration;

use cinefav_api::omdb::{MovieDetail, OmdbClient};
use cinefav_db::{FavoritesStore, MemoryKvStore, SqliteKvStore};
use cinefav_tui::screens::{DetailViewModel, FavoritesViewModel, SearchViewModel};

fn build_test_client(mock_server: &wiremock::MockServer) -> OmdbClient {
    let base_url = format!("{}/", mock_server.uri());
    OmdbClient::builder()
        .base_url(base_url.parse().unwrap())
        .api_key("test-key")
        .user_agent("test/0.0.0")
        .min_interval(Duration::from_millis(0))
        .build()
        .unwrap()
}

async fn mount_batman(mock_server: &wiremock::MockServer) {
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("s", "batman"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/search_batman.json")),
        )
        .mount(mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("i", "tt0372784"))
        .and(wiremock::matchers::query_param("plot", "full"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/details_tt0372784.json")),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_search_open_detail_and_favorite_twice() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    mount_batman(&mock_server).await;
    let api = build_test_client(&mock_server);
    let favorites = FavoritesStore::new(MemoryKvStore::new());

    // Act: search
    let mut search = SearchViewModel::new();
    search.search(&api, "batman").await;

    // Assert
    assert_eq!(search.results().len(), 7);
    let first = search.selected().unwrap().clone();
    assert_eq!(first.imdb_id, "tt0372784");

    // Act: open detail
    let mut detail = DetailViewModel::new(MovieDetail::from(first));
    detail.sync_favorite(&favorites).await;
    detail.refresh(&api).await;

    // Assert
    assert!(detail.is_loaded());
    assert!(detail.movie().plot.as_deref().unwrap().contains("Bruce Wayne"));
    assert!(!detail.is_favorite());

    // Act: favorite, then re-enter the screen and favorite again
    let added = detail.toggle_favorite(&favorites).await.unwrap();
    let mut reopened = DetailViewModel::new(detail.movie().clone());
    let already = {
        // Flag read before the first add completed elsewhere
        let mut stale = DetailViewModel::new(detail.movie().clone());
        stale.toggle_favorite(&favorites).await.unwrap()
    };
    reopened.sync_favorite(&favorites).await;

    // Assert
    assert_eq!(added.title, "Added to Favorites");
    assert_eq!(already.title, "Already in Favorites");
    assert!(reopened.is_favorite());
    let stored = favorites.list().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].imdb_id, "tt0372784");
    assert!(stored[0].plot.as_deref().unwrap().contains("Bruce Wayne"));
}

#[tokio::test]
async fn test_detail_failure_keeps_summary_fields() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("s", "batman"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/search_batman.json")),
        )
        .mount(&mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("i", "tt0372784"))
        .respond_with(wiremock::ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;
    let api = build_test_client(&mock_server);

    let mut search = SearchViewModel::new();
    search.search(&api, "batman").await;
    let first = search.selected().unwrap().clone();

    // Act
    let mut detail = DetailViewModel::new(MovieDetail::from(first));
    detail.refresh(&api).await;

    // Assert
    assert!(!detail.is_loaded());
    assert_eq!(detail.movie().title, "Batman Begins");
    assert_eq!(detail.movie().year, "2005");
}

#[tokio::test]
async fn test_not_found_search_shows_placeholder() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/search_not_found.json")),
        )
        .mount(&mock_server)
        .await;
    let api = build_test_client(&mock_server);
    let mut search = SearchViewModel::new();

    // Act
    search.search(&api, "zzzzqqq").await;

    // Assert
    assert!(search.results().is_empty());
    assert!(search.shows_no_results());
}

#[tokio::test]
async fn test_favorites_screen_resyncs_after_detail_change() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    mount_batman(&mock_server).await;
    let api = build_test_client(&mock_server);
    let dir = tempfile::tempdir().unwrap();
    let favorites = FavoritesStore::new(SqliteKvStore::open(dir.path()).unwrap());

    let mut screen = FavoritesViewModel::new();
    screen.reload(&favorites).await;
    assert!(screen.entries().is_empty());

    // Act: favorite from the detail screen, then come back
    let mut search = SearchViewModel::new();
    search.search(&api, "batman").await;
    let mut detail = DetailViewModel::new(MovieDetail::from(search.selected().unwrap().clone()));
    detail.refresh(&api).await;
    detail.toggle_favorite(&favorites).await.unwrap();
    screen.reload(&favorites).await;

    // Assert
    assert_eq!(screen.entries().len(), 1);
    assert_eq!(screen.selected().unwrap().title, "Batman Begins");
}
