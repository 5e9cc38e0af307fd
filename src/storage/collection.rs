//! In-memory snapshot of the whole catalog.
//!
//! The file and hosted backends persist exactly this shape:
//!
//! ```json
//! { "books": [ ... ], "next_id": 3 }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Book;

fn first_id() -> i64 {
    1
}

/// Every stored book plus the identity the next created book will get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default = "first_id")]
    pub next_id: i64,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            next_id: first_id(),
        }
    }
}

/// A single-record mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Book),
    Update(Book),
    Delete(Book),
}

impl Change {
    /// The record the change acts on.
    pub fn book(&self) -> &Book {
        match self {
            Change::Insert(book) | Change::Update(book) | Change::Delete(book) => book,
        }
    }

    /// Short verb used in log lines.
    pub fn verb(&self) -> &'static str {
        match self {
            Change::Insert(_) => "insert",
            Change::Update(_) => "update",
            Change::Delete(_) => "delete",
        }
    }
}

impl CollectionState {
    /// Build a state from bare records, deriving the counter from them.
    pub fn from_books(books: Vec<Book>) -> Self {
        let mut state = Self {
            books,
            next_id: first_id(),
        };
        state.normalize();
        state
    }

    /// Raise `next_id` above every stored id.
    ///
    /// Hand-edited or partially written documents can carry a stale or
    /// missing counter; identities must still never be reused.
    pub fn normalize(&mut self) {
        let floor = self.max_id().map_or(first_id(), |max| max + 1);
        self.next_id = self.next_id.max(floor);
    }

    /// Highest stored identity, if any.
    pub fn max_id(&self) -> Option<i64> {
        self.books.iter().map(|b| b.id).max()
    }

    pub fn find(&self, id: i64) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Apply one change to the snapshot.
    ///
    /// Updates and deletes of an unknown id leave the books untouched.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::Insert(book) => {
                self.books.push(book.clone());
                self.next_id = self.next_id.max(book.id + 1);
            }
            Change::Update(book) => {
                if let Some(slot) = self.books.iter_mut().find(|b| b.id == book.id) {
                    *slot = book.clone();
                }
            }
            Change::Delete(book) => self.books.retain(|b| b.id != book.id),
        }
    }
}
