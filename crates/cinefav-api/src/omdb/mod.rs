//! OMDb API client module.
//!
//! Handles HTTP requests to the OMDb search (`?s=`) and detail (`?i=`)
//! endpoints.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalOmdbApi, OmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{OmdbClient, OmdbClientBuilder};
pub use types::{
    DetailParams, MediaType, MovieDetail, MovieSummary, PlotLength, SearchPage, SearchParams,
};
