//! `OmdbClient` - OMDb API client implementation.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;
use url::Url;

use super::api::LocalOmdbApi;
use super::types::{
    DetailParams, MovieDetail, OmdbSearchResponse, OmdbStatus, SearchPage, SearchParams,
};

/// Default base URL for the OMDb API.
const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Default spacing between requests.
///
/// Searches fire on every keystroke and OMDb keys carry a daily quota.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// OMDb API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as the `apikey` query parameter.
    api_key: String,
    /// Minimum spacing between request starts.
    min_interval: Duration,
    /// Earliest start time for the next request.
    next_slot: Mutex<Option<Instant>>,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 100ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let api_key = self.api_key.context("api_key is required")?;
        if api_key.trim().is_empty() {
            bail!("api_key must not be empty");
        }
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key,
            min_interval: self.min_interval.unwrap_or(DEFAULT_MIN_INTERVAL),
            next_slot: Mutex::new(None),
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Reserves the next request slot and sleeps until it opens.
    ///
    /// The lock is held only while reserving. Overlapping lookups start one
    /// `min_interval` apart.
    async fn pace(&self) {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next_slot.map_or(now, |at| at.max(now));
            *next_slot = slot.checked_add(self.min_interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    /// Sends a GET request with the API key, query params, and rate limiting.
    ///
    /// OMDb reports most failures as HTTP 200 with `"Response": "False"`,
    /// so the status envelope is checked before decoding `T`.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.pace().await;

        tracing::debug!(url = %self.base_url, ?query, "OMDb API request");

        let request = self
            .http_client
            .get(self.base_url.clone())
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .build()
            .context("failed to build request")?;

        let result = self.http_client.execute(request).await;
        let response = result.context("OMDb request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            if let Ok(envelope) = serde_json::from_str::<OmdbStatus>(&body)
                && let Some(message) = envelope.error
            {
                bail!("OMDb API error (HTTP {status}): {message}");
            }
            bail!("OMDb API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        let envelope: OmdbStatus =
            serde_json::from_str(&body).context("failed to decode JSON response")?;
        if !envelope.response {
            let message = envelope.error.as_deref().unwrap_or("unknown error");
            bail!("OMDb API error: {message}");
        }

        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        let parsed = raw_result.context("failed to decode JSON response")?;
        Ok(parsed)
    }
}

impl LocalOmdbApi for OmdbClient {
    #[instrument(skip_all, fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("s", params.query.clone()),
            ("page", params.page.to_string()),
        ];
        if let Some(media_type) = params.media_type {
            query.push(("type", String::from(media_type.as_str())));
        }
        if let Some(year) = params.year {
            query.push(("y", year.to_string()));
        }

        let response: OmdbSearchResponse = self.get_json(&query).await?;
        let results = response.search.unwrap_or_default();
        let total_results = response
            .total_results
            .and_then(|total| total.parse().ok())
            .unwrap_or_else(|| u32::try_from(results.len()).unwrap_or(u32::MAX));

        Ok(SearchPage {
            results,
            total_results,
        })
    }

    #[instrument(skip_all, fields(imdb_id = %params.imdb_id))]
    async fn details(&self, params: &DetailParams) -> Result<MovieDetail> {
        let query = [
            ("i", params.imdb_id.clone()),
            ("plot", String::from(params.plot.as_str())),
        ];
        self.get_json(&query).await
    }
}
