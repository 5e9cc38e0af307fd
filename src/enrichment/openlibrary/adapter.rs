//! Adapter layer: Convert Open Library DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! If Open Library changes its response format, only this file and dto.rs
//! need to change.

use super::dto;
use crate::enrichment::domain::{EnrichmentError, SearchHit};

/// Text type marker for plain-text descriptions
const PLAIN_TEXT_TYPE: &str = "/type/text";

/// Take the first search result, or `NoMatches`
pub fn to_search_hit(response: dto::SearchResponse) -> Result<SearchHit, EnrichmentError> {
    let doc = response
        .docs
        .into_iter()
        .next()
        .ok_or(EnrichmentError::NoMatches)?;

    Ok(SearchHit {
        work_key: doc.key.or(doc.work_key).filter(|k| !k.trim().is_empty()),
        cover_id: doc.cover_i.filter(|id| *id > 0),
        edition_keys: doc
            .edition_key
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .collect(),
    })
}

/// First plain-text description among the editions
pub fn to_description(response: dto::EditionsResponse) -> Option<String> {
    response
        .entries
        .into_iter()
        .filter_map(|edition| edition.description)
        .find_map(|text| match text {
            dto::TextValue::Plain(value) => Some(value),
            dto::TextValue::Typed { kind, value } if kind == PLAIN_TEXT_TYPE => Some(value),
            dto::TextValue::Typed { .. } => None,
        })
        .filter(|value| !value.trim().is_empty())
}

/// Average rating, if the work has one
pub fn to_rating(response: dto::RatingsResponse) -> Option<f64> {
    response
        .summary
        .and_then(|summary| summary.average)
        .filter(|average| average.is_finite())
}

/// Bare work id from a key like "/works/OL45883W"
pub fn work_id(work_key: &str) -> &str {
    work_key
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(work_key)
}
