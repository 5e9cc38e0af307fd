//! Hosted JSON document store (JSONBin API).
//!
//! The catalog document lives in a single bin:
//! - `GET {url}/{bin_id}` returns `{"record": <document>, "metadata": {...}}`
//! - `PUT {url}/{bin_id}` replaces the document with the request body
//!
//! Requests carry `X-Master-Key`, `X-Access-Key` and `X-Bin-Id` headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use super::{Capability, CollectionState, StorageBackend, StorageError};
use crate::config::{ConfigError, HostedConfig};
use crate::error::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GET response wrapper
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    record: Option<CollectionState>,
}

/// Keeps the whole catalog in a hosted bin.
///
/// Load failures read as an empty catalog. Save failures are logged and
/// not reported to the caller.
pub struct HostedStorage {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HostedStorage {
    /// Build a client for the configured bin.
    ///
    /// Missing bin id or keys are configuration errors.
    pub fn from_config(config: &HostedConfig) -> Result<Self> {
        let bin_id = required(&config.bin_id, "JSONBIN_BIN_ID")?;
        let master_key = required(&config.master_key, "JSONBIN_X_MASTER_KEY")?;
        let access_key = required(&config.access_key, "JSONBIN_X_ACCESS_KEY")?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert_header(&mut headers, "x-master-key", master_key, "JSONBIN_X_MASTER_KEY")?;
        insert_header(&mut headers, "x-access-key", access_key, "JSONBIN_X_ACCESS_KEY")?;
        insert_header(&mut headers, "x-bin-id", bin_id, "JSONBIN_BIN_ID")?;

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StorageError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/{}", config.url.trim_end_matches('/'), bin_id),
        })
    }

    async fn fetch(&self) -> std::result::Result<CollectionState, StorageError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Http(format!("GET returned HTTP {status}")));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| StorageError::Http(format!("unreadable document: {e}")))?;

        let mut state = envelope.record.unwrap_or_default();
        state.normalize();
        Ok(state)
    }

    async fn store(&self, state: &CollectionState) -> std::result::Result<(), StorageError> {
        let response = self
            .http_client
            .put(&self.endpoint)
            .json(state)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Http(format!("PUT returned HTTP {status}")));
        }
        Ok(())
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> std::result::Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn insert_header(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
    key: &'static str,
) -> std::result::Result<(), ConfigError> {
    let value = HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: "<not a valid header value>".to_string(),
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

#[async_trait]
impl StorageBackend for HostedStorage {
    fn name(&self) -> &'static str {
        "jsonbin"
    }

    fn capability(&self) -> Capability {
        Capability::FullCollection
    }

    async fn load_collection(&self) -> CollectionState {
        match self.fetch().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Failed to load catalog from hosted store: {}", e);
                CollectionState::default()
            }
        }
    }

    async fn apply_full_collection(&self, state: &CollectionState) -> std::result::Result<(), StorageError> {
        match self.store(state).await {
            Ok(()) => tracing::debug!("Saved {} books to hosted store", state.books.len()),
            Err(e) => tracing::error!("Failed to save catalog to hosted store: {}", e),
        }
        Ok(())
    }
}
