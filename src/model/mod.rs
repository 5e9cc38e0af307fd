//! Core data models for the book catalog.
//!
//! Defines the primary entity [`Book`] together with the inputs that create
//! and modify it ([`NewBook`], [`BookUpdate`]) and the listing query
//! ([`BookQuery`]). These types are shared by every storage backend; the
//! persisted JSON document and the relational rows both map onto them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a book can currently be lent out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Borrowed,
}

impl Availability {
    /// The literal stored in documents and database rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Borrowed => "borrowed",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known availability literal.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown availability '{0}' (expected 'available' or 'borrowed')")]
pub struct ParseAvailabilityError(String);

impl FromStr for Availability {
    type Err = ParseAvailabilityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Availability::Available),
            "borrowed" => Ok(Availability::Borrowed),
            _ => Err(ParseAvailabilityError(s.to_string())),
        }
    }
}

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// System-assigned identity, never changes after creation
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub pages: u32,
    #[serde(default)]
    pub availability: Availability,
    /// Cover image URL (from enrichment)
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Plain-text description (from enrichment)
    #[serde(default)]
    pub description: Option<String>,
    /// Average reader rating, nominally 0.0 - 5.0 (from enrichment)
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Caller-supplied fields for a new book.
///
/// Identity and the enrichment fields are filled in by the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub pages: u32,
    #[serde(default)]
    pub availability: Option<Availability>,
}

impl NewBook {
    /// Reject empty text fields and a zero page count.
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        require_text("genre", &self.genre)?;
        require_pages(self.pages)
    }

    /// Build the stored record for this input under the given identity.
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publication_year: self.publication_year,
            genre: self.genre,
            pages: self.pages,
            availability: self.availability.unwrap_or_default(),
            cover_url: None,
            description: None,
            rating: None,
        }
    }
}

/// Partial update of a book.
///
/// A `None` field leaves the stored value untouched. There is no way to
/// clear a field through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
    pub pages: Option<u32>,
    pub availability: Option<Availability>,
}

impl BookUpdate {
    /// Reject present-but-empty text fields and a zero page count.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            require_text("title", title)?;
        }
        if let Some(ref author) = self.author {
            require_text("author", author)?;
        }
        if let Some(ref genre) = self.genre {
            require_text("genre", genre)?;
        }
        if let Some(pages) = self.pages {
            require_pages(pages)?;
        }
        Ok(())
    }

    /// The replacement title, if any. A new title needs fresh enrichment.
    pub fn new_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Overlay every present field onto `book`. Identity is never touched.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(year) = self.publication_year {
            book.publication_year = year;
        }
        if let Some(ref genre) = self.genre {
            book.genre = genre.clone();
        }
        if let Some(pages) = self.pages {
            book.pages = pages;
        }
        if let Some(availability) = self.availability {
            book.availability = availability;
        }
    }
}

/// Default page size for listings.
pub const DEFAULT_LIMIT: usize = 10;

/// Listing parameters: filters first, then an offset/limit window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub offset: usize,
    pub limit: usize,
    /// Case-insensitive exact match
    pub author: Option<String>,
    /// Case-insensitive exact match
    pub genre: Option<String>,
    pub availability: Option<Availability>,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            author: None,
            genre: None,
            availability: None,
        }
    }
}

impl BookQuery {
    /// Whether `book` passes every filter that is set.
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(ref author) = self.author
            && !same_text(&book.author, author)
        {
            return false;
        }
        if let Some(ref genre) = self.genre
            && !same_text(&book.genre, genre)
        {
            return false;
        }
        if let Some(availability) = self.availability
            && book.availability != availability
        {
            return false;
        }
        true
    }

    /// Filter `books` and cut the requested window out of the result.
    pub fn apply(&self, books: impl IntoIterator<Item = Book>) -> Vec<Book> {
        books
            .into_iter()
            .filter(|book| self.matches(book))
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

/// Case-insensitive equality, Unicode aware.
fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_pages(pages: u32) -> Result<()> {
    if pages == 0 {
        return Err(Error::validation("pages must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dune, sample_book};

    #[test]
    fn test_availability_parse_and_display() {
        assert_eq!("available".parse::<Availability>().unwrap(), Availability::Available);
        assert_eq!("BORROWED".parse::<Availability>().unwrap(), Availability::Borrowed);
        assert!("lost".parse::<Availability>().is_err());
        assert_eq!(Availability::Borrowed.to_string(), "borrowed");
    }

    #[test]
    fn test_book_serializes_availability_as_literal() {
        let json = serde_json::to_value(sample_book(1)).unwrap();
        assert_eq!(json["availability"], "available");
        assert_eq!(json["id"], 1);
        assert!(json["cover_url"].is_null());
    }

    #[test]
    fn test_book_deserializes_without_enrichment_fields() {
        let json = r#"{
            "id": 7,
            "title": "Dune",
            "author": "Frank Herbert",
            "publication_year": 1965,
            "genre": "Sci-Fi",
            "pages": 412
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.availability, Availability::Available);
        assert_eq!(book.rating, None);
    }

    #[test]
    fn test_new_book_defaults_availability() {
        let book = dune().into_book(3);
        assert_eq!(book.id, 3);
        assert_eq!(book.availability, Availability::Available);
        assert!(book.cover_url.is_none());
    }

    #[test]
    fn test_new_book_validation() {
        assert!(dune().validate().is_ok());

        let blank_title = NewBook {
            title: "   ".to_string(),
            ..dune()
        };
        assert!(matches!(blank_title.validate(), Err(Error::Validation(_))));

        let no_pages = NewBook { pages: 0, ..dune() };
        assert!(matches!(no_pages.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        assert!(BookUpdate::default().validate().is_ok());
        let update = BookUpdate {
            author: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_overlays_present_fields_only() {
        let mut book = sample_book(1);
        book.description = Some("kept".to_string());
        let update = BookUpdate {
            availability: Some(Availability::Borrowed),
            pages: Some(500),
            ..Default::default()
        };
        update.apply_to(&mut book);

        assert_eq!(book.id, 1);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.pages, 500);
        assert_eq!(book.availability, Availability::Borrowed);
        assert_eq!(book.description.as_deref(), Some("kept"));
        assert_eq!(update.new_title(), None);
    }

    #[test]
    fn test_empty_update_is_identity() {
        let mut book = sample_book(4);
        let before = book.clone();
        BookUpdate::default().apply_to(&mut book);
        assert_eq!(book, before);
    }

    #[test]
    fn test_query_filters_case_insensitively() {
        let query = BookQuery {
            author: Some("frank herbert".to_string()),
            genre: Some("SCI-FI".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&sample_book(1)));

        let partial = BookQuery {
            author: Some("frank".to_string()),
            ..Default::default()
        };
        assert!(!partial.matches(&sample_book(1)), "match must be exact");
    }

    #[test]
    fn test_query_availability_filter() {
        let mut borrowed = sample_book(2);
        borrowed.availability = Availability::Borrowed;
        let query = BookQuery {
            availability: Some(Availability::Available),
            ..Default::default()
        };
        assert!(query.matches(&sample_book(1)));
        assert!(!query.matches(&borrowed));
    }

    #[test]
    fn test_query_window_applies_after_filtering() {
        let mut books: Vec<Book> = (1..=6).map(sample_book).collect();
        for book in books.iter_mut().filter(|b| b.id % 2 == 0) {
            book.author = "Someone Else".to_string();
        }
        let query = BookQuery {
            offset: 1,
            limit: 1,
            author: Some("Frank Herbert".to_string()),
            ..Default::default()
        };
        let page = query.apply(books);
        // Matching ids are 1, 3, 5; skipping one leaves 3
        assert_eq!(page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn window_is_slice_of_filtered(
                genres in proptest::collection::vec(proptest::sample::select(vec!["Sci-Fi", "sci-fi", "Drama"]), 0..30),
                offset in 0usize..10,
                limit in 0usize..10,
            ) {
                let books: Vec<Book> = genres
                    .iter()
                    .enumerate()
                    .map(|(i, genre)| Book { genre: genre.to_string(), ..sample_book(i as i64 + 1) })
                    .collect();
                let query = BookQuery {
                    offset,
                    limit,
                    genre: Some("SCI-FI".to_string()),
                    ..Default::default()
                };

                let filtered: Vec<Book> = books.iter().filter(|b| query.matches(b)).cloned().collect();
                let expected: Vec<Book> = filtered.into_iter().skip(offset).take(limit).collect();
                let page = query.apply(books);

                prop_assert_eq!(&page, &expected);
                prop_assert!(page.iter().all(|b| b.genre.eq_ignore_ascii_case("sci-fi")));
            }
        }
    }
}
