//! Open Library HTTP client
//!
//! Handles communication with the Open Library web service.
//! See: https://openlibrary.org/developers/api
//!
//! No API key is required. Open Library asks clients to send a descriptive
//! User-Agent.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{adapter, dto};
use crate::enrichment::domain::{EnrichmentError, SearchHit};

/// User agent string sent with every request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Open Library API client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OpenLibraryClient {
    /// Create a client for the given host with a per-request timeout
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send a User-Agent header identifying the application
    /// - Give up on any single request after `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Search by title and return the first result
    pub async fn search_by_title(&self, title: &str) -> Result<SearchHit, EnrichmentError> {
        let query = format!("title:{title}");
        let url = format!(
            "{}/search.json?q={}&limit=1",
            self.base_url,
            urlencoding::encode(&query)
        );
        let response: dto::SearchResponse = self.get_json(&url).await?;
        adapter::to_search_hit(response)
    }

    /// First plain-text description among the work's editions
    pub async fn fetch_description(&self, work_key: &str) -> Result<Option<String>, EnrichmentError> {
        let url = format!(
            "{}/works/{}/editions.json",
            self.base_url,
            adapter::work_id(work_key)
        );
        let response: dto::EditionsResponse = self.get_json(&url).await?;
        Ok(adapter::to_description(response))
    }

    /// Average rating of the work
    pub async fn fetch_rating(&self, work_key: &str) -> Result<Option<f64>, EnrichmentError> {
        let url = format!(
            "{}/works/{}/ratings.json",
            self.base_url,
            adapter::work_id(work_key)
        );
        let response: dto::RatingsResponse = self.get_json(&url).await?;
        Ok(adapter::to_rating(response))
    }

    /// Send a GET request and parse the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EnrichmentError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::ApiError("rate limited".to_string()));
        }

        if !status.is_success() {
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }

    fn request_error(&self, error: reqwest::Error) -> EnrichmentError {
        if error.is_timeout() {
            EnrichmentError::Timeout(self.timeout)
        } else {
            EnrichmentError::Network(error.to_string())
        }
    }
}
