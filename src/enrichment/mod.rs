//! Book enrichment module - fetches cover, description and rating for a
//! title from Open Library.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`openlibrary/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Covers** - Deterministic cover URL construction
//! - **Service** - High-level orchestration of the enrichment flow
//!
//! Enrichment is strictly best effort: [`Enricher::enrich`] cannot fail, and
//! callers treat each of its three results as optional.
//!
//! # Usage
//!
//! ```ignore
//! use book_catalog::enrichment::{EnrichmentService, Enricher};
//!
//! let service = EnrichmentService::from_settings(&config.enrichment)?;
//! let found = service.enrich("Dune").await;
//! println!("Cover: {:?}, rating: {:?}", found.cover_url, found.rating);
//! ```

pub mod covers;
pub mod domain;
pub mod openlibrary;
pub mod service;
pub mod traits;

pub use covers::{CoverKey, CoverResolver, CoverSize};
pub use domain::{Enrichment, EnrichmentError, SearchHit};
pub use service::EnrichmentService;
pub use traits::{BookInfoApi, DisabledEnricher, Enricher};

use std::sync::Arc;

use crate::config::EnrichmentSettings;

/// Build the enricher described by `settings`.
pub fn from_settings(settings: &EnrichmentSettings) -> Result<Arc<dyn Enricher>, EnrichmentError> {
    if !settings.enabled {
        tracing::info!("Enrichment disabled by configuration");
        return Ok(Arc::new(DisabledEnricher));
    }
    Ok(Arc::new(EnrichmentService::from_settings(settings)?))
}
