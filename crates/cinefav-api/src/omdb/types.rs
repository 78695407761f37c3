//! OMDb API response types and request parameters.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Placeholder OMDb uses for missing values.
const NOT_AVAILABLE: &str = "N/A";

// --- Media Type ---

/// Kind of record returned by OMDb (`Type` field, `type` query parameter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Feature film.
    #[default]
    Movie,
    /// TV series.
    Series,
    /// Single TV episode.
    Episode,
    /// Video game.
    Game,
    /// Anything OMDb adds later.
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Returns the OMDb wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
            Self::Game => "game",
            Self::Other => "other",
        }
    }
}

impl From<&str> for MediaType {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "movie" => Self::Movie,
            "series" => Self::Series,
            "episode" => Self::Episode,
            "game" => Self::Game,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Status Envelope ---

/// Status fields present on every OMDb response body.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbStatus {
    /// `Response` flag (`"True"` / `"False"`).
    #[serde(rename = "Response", deserialize_with = "deserialize_flag")]
    pub response: bool,
    /// Error message when `response` is false.
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

// --- Search ---

/// Response from the search endpoint (`?s=`).
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    /// Matching records. OMDb omits the array on some positive responses.
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<MovieSummary>>,
    /// Total number of matches across all pages (string on the wire).
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Matches on this page.
    pub results: Vec<MovieSummary>,
    /// Total number of matches across all pages.
    pub total_results: u32,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieSummary {
    /// IMDb identifier (e.g. `tt0372784`).
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, or a range for series (e.g. `2008–2013`).
    #[serde(rename = "Year")]
    pub year: String,
    /// Poster image URL.
    #[serde(rename = "Poster", default, deserialize_with = "deserialize_available")]
    pub poster: Option<String>,
    /// Record kind.
    #[serde(rename = "Type", default)]
    pub media_type: MediaType,
}

// --- Detail ---

/// Response from the detail endpoint (`?i=`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieDetail {
    /// IMDb identifier.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year")]
    pub year: String,
    /// Poster image URL.
    #[serde(rename = "Poster", default, deserialize_with = "deserialize_available")]
    pub poster: Option<String>,
    /// Record kind.
    #[serde(rename = "Type", default)]
    pub media_type: MediaType,
    /// Plot text (short or full, depending on the request).
    #[serde(rename = "Plot", default, deserialize_with = "deserialize_available")]
    pub plot: Option<String>,
    /// Rating certificate (e.g. `PG-13`).
    #[serde(rename = "Rated", default, deserialize_with = "deserialize_available")]
    pub rated: Option<String>,
    /// Release date.
    #[serde(rename = "Released", default, deserialize_with = "deserialize_available")]
    pub released: Option<String>,
    /// Runtime (e.g. `140 min`).
    #[serde(rename = "Runtime", default, deserialize_with = "deserialize_available")]
    pub runtime: Option<String>,
    /// Comma-separated genres.
    #[serde(rename = "Genre", default, deserialize_with = "deserialize_available")]
    pub genre: Option<String>,
    /// Director(s).
    #[serde(rename = "Director", default, deserialize_with = "deserialize_available")]
    pub director: Option<String>,
    /// Writer(s).
    #[serde(rename = "Writer", default, deserialize_with = "deserialize_available")]
    pub writer: Option<String>,
    /// Main cast.
    #[serde(rename = "Actors", default, deserialize_with = "deserialize_available")]
    pub actors: Option<String>,
    /// Spoken languages.
    #[serde(rename = "Language", default, deserialize_with = "deserialize_available")]
    pub language: Option<String>,
    /// Production countries.
    #[serde(rename = "Country", default, deserialize_with = "deserialize_available")]
    pub country: Option<String>,
    /// Awards summary.
    #[serde(rename = "Awards", default, deserialize_with = "deserialize_available")]
    pub awards: Option<String>,
    /// IMDb user rating (e.g. `8.2`).
    #[serde(rename = "imdbRating", default, deserialize_with = "deserialize_available")]
    pub imdb_rating: Option<String>,
    /// IMDb vote count (e.g. `1,523,423`).
    #[serde(rename = "imdbVotes", default, deserialize_with = "deserialize_available")]
    pub imdb_votes: Option<String>,
}

impl MovieDetail {
    /// Returns the IMDb page URL for this record.
    #[must_use]
    pub fn imdb_url(&self) -> String {
        format!("https://www.imdb.com/title/{}/", self.imdb_id)
    }
}

impl From<MovieSummary> for MovieDetail {
    fn from(summary: MovieSummary) -> Self {
        Self {
            imdb_id: summary.imdb_id,
            title: summary.title,
            year: summary.year,
            poster: summary.poster,
            media_type: summary.media_type,
            plot: None,
            rated: None,
            released: None,
            runtime: None,
            genre: None,
            director: None,
            writer: None,
            actors: None,
            language: None,
            country: None,
            awards: None,
            imdb_rating: None,
            imdb_votes: None,
        }
    }
}

// --- Request Parameters ---

/// Parameters for the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text title query (required).
    pub query: String,
    /// Restrict to one record kind.
    pub media_type: Option<MediaType>,
    /// Restrict to one release year.
    pub year: Option<u32>,
    /// Result page (1-100, 10 results per page, default: 1).
    pub page: u32,
}

impl SearchParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            media_type: None,
            year: None,
            page: 1,
        }
    }

    /// Sets the record kind filter.
    #[must_use]
    pub const fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Plot length requested from the detail endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotLength {
    /// One-paragraph synopsis.
    Short,
    /// Full plot text.
    #[default]
    Full,
}

impl PlotLength {
    /// Returns the OMDb wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Full => "full",
        }
    }
}

/// Parameters for the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailParams {
    /// IMDb identifier (required).
    pub imdb_id: String,
    /// Plot length (default: full).
    pub plot: PlotLength,
}

impl DetailParams {
    /// Creates new detail params for the given identifier.
    pub fn new(imdb_id: impl Into<String>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            plot: PlotLength::default(),
        }
    }

    /// Sets the plot length.
    #[must_use]
    pub const fn plot(mut self, plot: PlotLength) -> Self {
        self.plot = plot;
        self
    }
}

// --- Deserialization Helpers ---

/// Parses OMDb's `"True"` / `"False"` strings.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(serde::de::Error::custom(format!(
            "invalid Response flag: {raw}"
        )))
    }
}

/// Maps `"N/A"` and empty strings to `None`.
fn deserialize_available<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|v| !v.is_empty() && v != NOT_AVAILABLE))
}
