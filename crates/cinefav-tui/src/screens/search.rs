//! Search screen state.
//!
//! Every query change is stamped with a sequence number. Only the response
//! carrying the latest number is applied, so a slow lookup for an old query
//! can never overwrite the results for the current one.
#![allow(clippy::future_not_send)]

use std::collections::HashSet;

use anyhow::Result;
use cinefav_api::omdb::{LocalOmdbApi, MovieSummary, SearchPage, SearchParams};
use ratatui::widgets::ListState;

/// A lookup the caller should issue on behalf of the search screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Sequence number to hand back to [`SearchViewModel::apply`].
    pub seq: u64,
    /// Lookup parameters.
    pub params: SearchParams,
}

impl SearchRequest {
    /// Runs the lookup against `api`.
    ///
    /// # Errors
    ///
    /// Returns the lookup error unchanged.
    pub async fn fetch<A: LocalOmdbApi>(&self, api: &A) -> Result<SearchPage> {
        api.search(&self.params).await
    }
}

/// State for the search screen.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchViewModel {
    /// Current query text.
    query: String,
    /// Results for the current query.
    results: Vec<MovieSummary>,
    /// Total matches reported by the server.
    total_results: u32,
    /// Sequence number of the latest query change.
    latest_seq: u64,
    /// Whether a lookup for the latest query is outstanding.
    loading: bool,
    /// List selection.
    pub list_state: ListState,
}

impl SearchViewModel {
    /// Creates an empty search screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the results for the current query.
    #[must_use]
    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    /// Returns the total match count reported for the current query.
    #[must_use]
    pub const fn total_results(&self) -> u32 {
        self.total_results
    }

    /// Returns `true` while the lookup for the current query is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns `true` when the "no results" placeholder should be shown.
    #[must_use]
    pub fn shows_no_results(&self) -> bool {
        !self.query.is_empty() && !self.loading && self.results.is_empty()
    }

    /// Replaces the query text.
    ///
    /// An empty query clears the results immediately and issues nothing.
    /// Any outstanding lookup becomes stale either way.
    pub fn set_query(&mut self, text: impl Into<String>) -> Option<SearchRequest> {
        self.query = text.into();
        self.latest_seq = self.latest_seq.saturating_add(1);

        if self.query.is_empty() {
            self.results.clear();
            self.total_results = 0;
            self.loading = false;
            self.list_state.select(None);
            return None;
        }

        self.loading = true;
        Some(SearchRequest {
            seq: self.latest_seq,
            params: SearchParams::new(self.query.clone()),
        })
    }

    /// Appends a character to the query.
    pub fn push_char(&mut self, ch: char) -> Option<SearchRequest> {
        let mut query = self.query.clone();
        query.push(ch);
        self.set_query(query)
    }

    /// Removes the last character of the query. Does nothing on an empty query.
    pub fn pop_char(&mut self) -> Option<SearchRequest> {
        if self.query.is_empty() {
            return None;
        }
        let mut query = self.query.clone();
        query.pop();
        self.set_query(query)
    }

    /// Applies a lookup result. Returns `false` if `seq` is stale and the
    /// result was dropped.
    ///
    /// A failed lookup is logged and leaves an empty result list.
    pub fn apply(&mut self, seq: u64, result: Result<SearchPage>) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "dropping stale search response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                let mut seen = HashSet::new();
                self.results = page
                    .results
                    .into_iter()
                    .filter(|movie| seen.insert(movie.imdb_id.clone()))
                    .collect();
                self.total_results = page.total_results;
            }
            Err(e) => {
                tracing::warn!("search for {:?} failed: {e:#}", self.query);
                self.results.clear();
                self.total_results = 0;
            }
        }

        self.list_state
            .select(if self.results.is_empty() { None } else { Some(0) });
        true
    }

    /// Sets the query and, if a lookup is needed, runs it to completion.
    pub async fn search<A: LocalOmdbApi>(&mut self, api: &A, text: impl Into<String>) {
        if let Some(request) = self.set_query(text) {
            let result = request.fetch(api).await;
            self.apply(request.seq, result);
        }
    }

    /// Returns the selected result.
    #[must_use]
    pub fn selected(&self) -> Option<&MovieSummary> {
        self.list_state
            .selected()
            .and_then(|idx| self.results.get(idx))
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
        if self.results.is_empty() {
            return;
        }
        let next = self
            .list_state
            .selected()
            .map_or(0, |current| (current + 1).min(self.results.len() - 1));
        self.list_state.select(Some(next));
    }
}
