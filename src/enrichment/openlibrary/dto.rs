//! Open Library API Data Transfer Objects
//!
//! These types match what the Open Library API returns, limited to the
//! fields we read. DO NOT use these types outside the openlibrary module -
//! convert to domain types in the adapter.
//!
//! API Reference: https://openlibrary.org/developers/api

use serde::{Deserialize, Serialize};

/// `/search.json` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Total number of matches
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    /// Matching works, best first
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// A single search result (a work)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchDoc {
    /// Work key, e.g. "/works/OL45883W"
    pub key: Option<String>,
    /// Older responses carry the work key under this name
    pub work_key: Option<String>,
    pub title: Option<String>,
    /// Numeric cover id (can be -1 when the work has no cover)
    pub cover_i: Option<i64>,
    /// Edition OLIDs
    #[serde(default)]
    pub edition_key: Vec<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub first_publish_year: Option<i32>,
}

/// `/works/{id}/editions.json` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditionsResponse {
    #[serde(default)]
    pub entries: Vec<Edition>,
    pub size: Option<u64>,
}

/// An edition of a work
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Edition {
    pub key: Option<String>,
    pub title: Option<String>,
    pub description: Option<TextValue>,
}

/// Open Library text fields come either as a bare string or as a typed value
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Typed {
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },
}

/// `/works/{id}/ratings.json` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingsResponse {
    pub summary: Option<RatingSummary>,
}

/// Aggregate rating for a work
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: Option<u64>,
}
