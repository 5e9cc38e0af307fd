//! Enrichment service - orchestrates the Open Library lookups for a title
//!
//! This is the high-level API used by the catalog:
//! 1. Search by title and keep the first result
//! 2. Fetch the work's description and rating (concurrently)
//! 3. Build a cover URL from the cover id, else from the first edition
//!
//! Every step is best effort. A failed or slow step only leaves its own
//! field empty; the call as a whole never fails.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::EnrichmentSettings;
use crate::enrichment::{
    covers::{CoverKey, CoverResolver, CoverSize},
    domain::{Enrichment, EnrichmentError, SearchHit},
    openlibrary::OpenLibraryClient,
    traits::{BookInfoApi, Enricher},
};

/// Service for enriching book records from Open Library
pub struct EnrichmentService<A = OpenLibraryClient> {
    api: A,
    covers: CoverResolver,
    cover_size: CoverSize,
    step_timeout: Duration,
}

impl EnrichmentService<OpenLibraryClient> {
    /// Create a service talking to the hosts named in `settings`
    pub fn from_settings(settings: &EnrichmentSettings) -> Result<Self, EnrichmentError> {
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let api = OpenLibraryClient::new(&settings.search_base_url, timeout)?;
        Ok(Self::with_api(
            api,
            CoverResolver::new(&settings.covers_base_url),
            settings.cover_size,
            timeout,
        ))
    }
}

impl<A: BookInfoApi> EnrichmentService<A> {
    /// Create a service over any lookup API (used by tests with mocks)
    pub fn with_api(api: A, covers: CoverResolver, cover_size: CoverSize, step_timeout: Duration) -> Self {
        Self {
            api,
            covers,
            cover_size,
            step_timeout,
        }
    }

    /// First search result for a title, or `None` on no match or failure
    pub async fn lookup_by_title(&self, title: &str) -> Option<SearchHit> {
        match self.bounded(self.api.search_by_title(title)).await {
            Ok(hit) => Some(hit),
            Err(EnrichmentError::NoMatches) => {
                tracing::debug!("No Open Library match for {:?}", title);
                None
            }
            Err(e) => {
                tracing::warn!("Open Library search failed for {:?}: {}", title, e);
                None
            }
        }
    }

    /// Plain-text description for a work, or `None`
    pub async fn fetch_description(&self, work_key: &str) -> Option<String> {
        self.bounded(self.api.fetch_description(work_key))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Description lookup failed for {}: {}", work_key, e);
                None
            })
    }

    /// Average rating for a work, or `None`
    pub async fn fetch_rating(&self, work_key: &str) -> Option<f64> {
        self.bounded(self.api.fetch_rating(work_key))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Rating lookup failed for {}: {}", work_key, e);
                None
            })
    }

    /// Cover URL for a key at the given size
    pub fn resolve_cover_url(&self, key: &CoverKey, size: CoverSize) -> Option<String> {
        self.covers.resolve(key, size)
    }

    /// Run all lookups for a title and collect whatever resolved
    async fn resolve(&self, title: &str) -> Enrichment {
        if title.trim().is_empty() {
            return Enrichment::default();
        }

        let Some(hit) = self.lookup_by_title(title).await else {
            return Enrichment::default();
        };

        let (description, rating) = match hit.work_key.as_deref() {
            Some(work_key) => tokio::join!(self.fetch_description(work_key), self.fetch_rating(work_key)),
            None => (None, None),
        };

        let cover_url = hit
            .cover_id
            .and_then(|id| self.resolve_cover_url(&CoverKey::Id(id), self.cover_size))
            .or_else(|| {
                hit.edition_keys
                    .first()
                    .and_then(|olid| self.resolve_cover_url(&CoverKey::Olid(olid.clone()), self.cover_size))
            });

        Enrichment {
            cover_url,
            description,
            rating,
        }
    }

    /// Bound a single lookup step by the configured timeout
    async fn bounded<T>(
        &self,
        step: impl Future<Output = Result<T, EnrichmentError>>,
    ) -> Result<T, EnrichmentError> {
        tokio::time::timeout(self.step_timeout, step)
            .await
            .unwrap_or(Err(EnrichmentError::Timeout(self.step_timeout)))
    }
}

#[async_trait]
impl<A: BookInfoApi> Enricher for EnrichmentService<A> {
    async fn enrich(&self, title: &str) -> Enrichment {
        let found = self.resolve(title).await;
        tracing::info!(
            "Enriched {:?}: cover={}, description={}, rating={}",
            title,
            found.cover_url.is_some(),
            found.description.is_some(),
            found.rating.is_some()
        );
        found
    }
}
