//! API client library for cinefav.
//!
//! Provides a client for the OMDb movie database API.

/// OMDb API client.
pub mod omdb;
