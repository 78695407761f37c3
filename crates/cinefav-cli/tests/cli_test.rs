#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::path::Path;

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

/// Writes a config pointing the client at `base_url`.
fn write_config(dir: &Path, base_url: &str) {
    let content = format!(
        "[omdb]\napi_key = \"test-key\"\nbase_url = \"{base_url}/\"\nmin_interval_ms = 0\n"
    );
    std::fs::write(dir.join("config.toml"), content).unwrap();
}

async fn mount_fixtures(mock_server: &wiremock::MockServer) {
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("apikey", "test-key"))
        .and(wiremock::matchers::query_param("s", "batman"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/search_batman.json")),
        )
        .mount(mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("i", "tt0372784"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/details_tt0372784.json")),
        )
        .mount(mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("i", "tt0000000"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/omdb/details_invalid_id.json")),
        )
        .mount(mock_server)
        .await;
}

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("tui"));
}

#[test]
fn test_search_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--query"))
        .stdout(predicate::str::contains("--type"));
}

#[test]
fn test_search_missing_query() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_search_rejects_page_out_of_range() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["search", "--query", "batman", "--page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--page"));
}

#[test]
fn test_search_without_api_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.env_remove("OMDB_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["search", "--query", "batman"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OMDB_API_KEY"));
}

#[test]
fn test_favorites_list_empty() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorites yet."));
}

#[test]
fn test_favorites_remove_absent_id() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["favorites", "remove", "--id", "tt0372784"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not in favorites: tt0372784"));
}

#[test]
fn test_dir_holds_database() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["favorites", "list"])
        .assert()
        .success();

    // Assert
    assert!(dir.path().join("cinefav.db").exists());
}

#[test]
fn test_xdg_data_home_holds_database() {
    // Arrange
    let data_home = tempfile::tempdir().unwrap();
    let config_home = tempfile::tempdir().unwrap();

    // Act
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.env("XDG_DATA_HOME", data_home.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorites yet."));

    // Assert
    assert!(data_home.path().join("cinefav").join("cinefav.db").exists());
}

#[test]
fn test_completions_bash() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cinefav"));
}

#[tokio::test]
async fn test_search_prints_results() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    mount_fixtures(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &mock_server.uri());

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.env_remove("OMDB_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["search", "--query", "batman"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total results: 612"))
        .stdout(predicate::str::contains("tt0372784"))
        .stdout(predicate::str::contains("Batman Begins"));
}

#[tokio::test]
async fn test_details_invalid_id_fails() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    mount_fixtures(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &mock_server.uri());

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefav");
    cmd.env_remove("OMDB_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["details", "--id", "tt0000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect IMDb ID."));
}

#[tokio::test]
async fn test_favorites_add_twice_keeps_one_entry() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    mount_fixtures(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &mock_server.uri());
    let dir_arg = dir.path().to_str().unwrap();

    // Act & Assert
    cargo_bin_cmd!("cinefav")
        .env_remove("OMDB_API_KEY")
        .args(["--dir", dir_arg, "favorites", "add", "--id", "tt0372784"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added to Favorites: Batman Begins"));

    cargo_bin_cmd!("cinefav")
        .env_remove("OMDB_API_KEY")
        .args(["--dir", dir_arg, "favorites", "add", "--id", "tt0372784"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already in Favorites: Batman Begins"));

    cargo_bin_cmd!("cinefav")
        .args(["--dir", dir_arg, "favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tt0372784"))
        .stdout(predicate::str::contains("Total: 1 favorites"));

    cargo_bin_cmd!("cinefav")
        .args(["--dir", dir_arg, "favorites", "remove", "--id", "tt0372784"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed from Favorites: tt0372784"));
}
