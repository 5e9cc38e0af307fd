//! Trait definitions for enrichment collaborators.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`OpenLibraryClient`](super::OpenLibraryClient)
//! behind [`BookInfoApi`] and [`EnrichmentService`](super::EnrichmentService)
//! behind [`Enricher`]; tests substitute the mocks below.
//!
//! # Example
//!
//! ```ignore
//! use book_catalog::enrichment::traits::Enricher;
//!
//! async fn describe<E: Enricher + ?Sized>(enricher: &E, title: &str) {
//!     let found = enricher.enrich(title).await;
//!     println!("{:?}", found.description);
//! }
//! ```

use async_trait::async_trait;

use super::domain::{Enrichment, EnrichmentError, SearchHit};

/// Low-level bibliographic lookups.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait BookInfoApi: Send + Sync {
    /// Best search match for a title.
    async fn search_by_title(&self, title: &str) -> Result<SearchHit, EnrichmentError>;

    /// First plain-text edition description of a work.
    async fn fetch_description(&self, work_key: &str) -> Result<Option<String>, EnrichmentError>;

    /// Average rating of a work.
    async fn fetch_rating(&self, work_key: &str) -> Result<Option<f64>, EnrichmentError>;
}

/// Best-effort metadata for a title.
///
/// Implementations never fail; whatever could not be resolved is absent.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, title: &str) -> Enrichment;
}

#[async_trait]
impl BookInfoApi for super::openlibrary::OpenLibraryClient {
    async fn search_by_title(&self, title: &str) -> Result<SearchHit, EnrichmentError> {
        self.search_by_title(title).await
    }

    async fn fetch_description(&self, work_key: &str) -> Result<Option<String>, EnrichmentError> {
        self.fetch_description(work_key).await
    }

    async fn fetch_rating(&self, work_key: &str) -> Result<Option<f64>, EnrichmentError> {
        self.fetch_rating(work_key).await
    }
}

/// Enricher used when enrichment is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEnricher;

#[async_trait]
impl Enricher for DisabledEnricher {
    async fn enrich(&self, _title: &str) -> Enrichment {
        Enrichment::default()
    }
}
