//! Internal domain models for book enrichment.
//!
//! These types are OUR types - they don't change when the Open Library API
//! changes. All API responses get converted into these types via adapters.

use std::time::Duration;

use crate::model::Book;

/// The best search match for a title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    /// Work key, e.g. "/works/OL45883W"
    pub work_key: Option<String>,
    /// Numeric cover id (positive values only)
    pub cover_id: Option<i64>,
    /// Edition keys in the order the API lists them, e.g. "OL7353617M"
    pub edition_keys: Vec<String>,
}

/// Metadata gathered for a book. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
}

impl Enrichment {
    /// True when nothing could be resolved.
    pub fn is_empty(&self) -> bool {
        self.cover_url.is_none() && self.description.is_none() && self.rating.is_none()
    }

    /// Overlay the resolved fields onto `book`.
    ///
    /// Only present values overwrite; an absent field never erases what the
    /// book already has.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref url) = self.cover_url {
            book.cover_url = Some(url.clone());
        }
        if let Some(ref description) = self.description {
            book.description = Some(description.clone());
        }
        if let Some(rating) = self.rating {
            book.rating = Some(rating);
        }
    }
}

/// Errors that can occur while talking to the bibliographic API.
///
/// These never escape the enrichment service; they are logged and turned
/// into absent fields.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
