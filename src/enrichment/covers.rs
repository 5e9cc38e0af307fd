//! Open Library cover URLs
//!
//! Covers are served from a separate host and addressed either by a numeric
//! cover id or by an edition OLID. No request is made here; the URL is
//! deterministic.
//!
//! API: https://openlibrary.org/dev/docs/api/covers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Desired cover image size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverSize {
    /// Small thumbnail
    #[serde(rename = "S")]
    Small,
    /// Medium (default)
    #[default]
    #[serde(rename = "M")]
    Medium,
    /// Large
    #[serde(rename = "L")]
    Large,
}

impl CoverSize {
    /// Size token used in cover URLs
    pub fn token(self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

impl fmt::Display for CoverSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CoverSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" | "SMALL" => Ok(CoverSize::Small),
            "M" | "MEDIUM" => Ok(CoverSize::Medium),
            "L" | "LARGE" => Ok(CoverSize::Large),
            other => Err(format!("unknown cover size '{other}' (expected S, M or L)")),
        }
    }
}

/// What a cover is addressed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverKey {
    /// Numeric cover id from search results
    Id(i64),
    /// Edition identifier; a path prefix such as "/books/" is ignored
    Olid(String),
}

/// Builds cover URLs against a cover host
#[derive(Debug, Clone)]
pub struct CoverResolver {
    base_url: String,
}

impl CoverResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a cover URL, or `None` when the key is empty or not positive.
    pub fn resolve(&self, key: &CoverKey, size: CoverSize) -> Option<String> {
        match key {
            CoverKey::Id(id) if *id > 0 => Some(format!(
                "{}/id/{}-{}.jpg",
                self.base_url,
                id,
                size.token()
            )),
            CoverKey::Id(_) => None,
            CoverKey::Olid(identifier) => {
                let olid = identifier.rsplit('/').next().unwrap_or_default().trim();
                if olid.is_empty() {
                    return None;
                }
                Some(format!(
                    "{}/OLID/{}-{}.jpg",
                    self.base_url,
                    urlencoding::encode(olid),
                    size.token()
                ))
            }
        }
    }
}

impl Default for CoverResolver {
    fn default() -> Self {
        Self::new("https://covers.openlibrary.org/b")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_size_default() {
        assert_eq!(CoverSize::default(), CoverSize::Medium);
        assert_eq!("l".parse::<CoverSize>().unwrap(), CoverSize::Large);
        assert!("XL".parse::<CoverSize>().is_err());
    }

    #[test]
    fn test_resolve_by_numeric_id() {
        let covers = CoverResolver::default();
        assert_eq!(
            covers.resolve(&CoverKey::Id(8231856), CoverSize::Medium).as_deref(),
            Some("https://covers.openlibrary.org/b/id/8231856-M.jpg")
        );
    }

    #[test]
    fn test_resolve_rejects_placeholder_ids() {
        let covers = CoverResolver::default();
        assert_eq!(covers.resolve(&CoverKey::Id(-1), CoverSize::Small), None);
        assert_eq!(covers.resolve(&CoverKey::Id(0), CoverSize::Small), None);
    }

    #[test]
    fn test_resolve_by_olid_strips_prefix() {
        let covers = CoverResolver::new("http://localhost:9/b/");
        assert_eq!(
            covers
                .resolve(&CoverKey::Olid("/books/OL7353617M".to_string()), CoverSize::Large)
                .as_deref(),
            Some("http://localhost:9/b/OLID/OL7353617M-L.jpg")
        );
    }

    #[test]
    fn test_resolve_empty_identifier() {
        let covers = CoverResolver::default();
        assert_eq!(covers.resolve(&CoverKey::Olid(String::new()), CoverSize::Medium), None);
        assert_eq!(covers.resolve(&CoverKey::Olid("/books/".to_string()), CoverSize::Medium), None);
    }

    #[test]
    fn test_size_serializes_as_token() {
        assert_eq!(serde_json::to_string(&CoverSize::Large).unwrap(), "\"L\"");
        let size: CoverSize = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(size, CoverSize::Small);
    }
}
