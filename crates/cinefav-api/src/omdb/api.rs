//! `OmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{DetailParams, MovieDetail, SearchPage, SearchParams};

/// OMDb API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(OmdbApi: Send)]
pub trait LocalOmdbApi {
    /// Searches for titles matching a free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the body cannot be decoded,
    /// or OMDb answers with a negative `Response` flag.
    async fn search(&self, params: &SearchParams) -> Result<SearchPage>;

    /// Fetches the full record for one IMDb identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the body cannot be decoded,
    /// or OMDb answers with a negative `Response` flag.
    async fn details(&self, params: &DetailParams) -> Result<MovieDetail>;
}
