//! SQL database backend, one row per book.
//!
//! Uses SQLx's `Any` driver so the same queries run against PostgreSQL in
//! production and SQLite for local use and tests. The schema is created by
//! the embedded migrations when the pool is opened.
//!
//! # Example
//!
//! ```ignore
//! use book_catalog::storage::RelationalStorage;
//!
//! let storage = RelationalStorage::connect(&config.database).await?;
//! let next = storage.next_identity().await;
//! ```

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{AnyPool, FromRow};

use super::{Capability, Change, CollectionState, StorageBackend, StorageError};
use crate::config::DatabaseConfig;
use crate::model::Book;

const SELECT_BOOKS: &str = "SELECT id, title, author, publication_year, genre, pages, availability, \
     cover_url, description, rating FROM books";

/// A `books` row as the driver returns it.
#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    publication_year: i64,
    genre: String,
    pages: i64,
    availability: String,
    cover_url: Option<String>,
    description: Option<String>,
    rating: Option<f64>,
}

impl TryFrom<BookRow> for Book {
    type Error = String;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Book {
            id: row.id,
            publication_year: i32::try_from(row.publication_year)
                .map_err(|_| format!("publication_year {} out of range", row.publication_year))?,
            pages: u32::try_from(row.pages).map_err(|_| format!("pages {} out of range", row.pages))?,
            availability: row.availability.parse().map_err(|e| format!("{e}"))?,
            title: row.title,
            author: row.author,
            genre: row.genre,
            cover_url: row.cover_url,
            description: row.description,
            rating: row.rating,
        })
    }
}

/// Convert fetched rows, skipping (and logging) any that don't fit the model.
fn into_books(rows: Vec<BookRow>) -> Vec<Book> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            Book::try_from(row)
                .inspect_err(|e| tracing::warn!("Skipping unreadable book row {}: {}", id, e))
                .ok()
        })
        .collect()
}

/// Keeps each book in its own row of the `books` table.
///
/// Every mutation is its own transaction and is rolled back on error.
/// Errors are logged, never returned: a failed lookup reads as absent and a
/// failed identity query yields 1.
pub struct RelationalStorage {
    pool: AnyPool,
}

impl RelationalStorage {
    /// Open a pool for the configured database and run pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.connection_url())
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Books database ready");

        Ok(Self { pool })
    }

    /// Run one change inside a transaction and return the affected row count.
    async fn execute(&self, change: &Change) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let book = change.book();

        let result = match change {
            Change::Insert(_) => {
                sqlx::query(
                    "INSERT INTO books (id, title, author, publication_year, genre, pages, availability, \
                     cover_url, description, rating) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                )
                .bind(book.id)
                .bind(&book.title)
                .bind(&book.author)
                .bind(i64::from(book.publication_year))
                .bind(&book.genre)
                .bind(i64::from(book.pages))
                .bind(book.availability.as_str())
                .bind(book.cover_url.clone())
                .bind(book.description.clone())
                .bind(book.rating)
                .execute(&mut *tx)
                .await
            }
            Change::Update(_) => {
                sqlx::query(
                    "UPDATE books SET title = $1, author = $2, publication_year = $3, genre = $4, \
                     pages = $5, availability = $6, cover_url = $7, description = $8, rating = $9 \
                     WHERE id = $10",
                )
                .bind(&book.title)
                .bind(&book.author)
                .bind(i64::from(book.publication_year))
                .bind(&book.genre)
                .bind(i64::from(book.pages))
                .bind(book.availability.as_str())
                .bind(book.cover_url.clone())
                .bind(book.description.clone())
                .bind(book.rating)
                .bind(book.id)
                .execute(&mut *tx)
                .await
            }
            Change::Delete(_) => {
                sqlx::query("DELETE FROM books WHERE id = $1")
                    .bind(book.id)
                    .execute(&mut *tx)
                    .await
            }
        };

        match result {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.rows_affected())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl StorageBackend for RelationalStorage {
    fn name(&self) -> &'static str {
        "db"
    }

    fn capability(&self) -> Capability {
        Capability::RowScoped
    }

    async fn load_collection(&self) -> CollectionState {
        let query = format!("{SELECT_BOOKS} ORDER BY id");
        match sqlx::query_as::<_, BookRow>(&query).fetch_all(&self.pool).await {
            Ok(rows) => CollectionState::from_books(into_books(rows)),
            Err(e) => {
                tracing::warn!("Failed to load books: {}", e);
                CollectionState::default()
            }
        }
    }

    async fn next_identity(&self) -> i64 {
        let row: Result<Option<(i64,)>, sqlx::Error> =
            sqlx::query_as("SELECT id FROM books ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await;

        match row {
            Ok(Some((max,))) => max + 1,
            Ok(None) => 1,
            Err(e) => {
                tracing::warn!("Failed to query highest book id: {}", e);
                1
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Option<Book> {
        let query = format!("{SELECT_BOOKS} WHERE id = $1");
        match sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => row.and_then(|row| into_books(vec![row]).pop()),
            Err(e) => {
                tracing::warn!("Failed to look up book {}: {}", id, e);
                None
            }
        }
    }

    async fn apply_delta(&self, change: &Change) -> Result<(), StorageError> {
        let id = change.book().id;
        match self.execute(change).await {
            Ok(0) if !matches!(change, Change::Insert(_)) => {
                tracing::warn!("No book {} to {}", id, change.verb());
            }
            Ok(_) => tracing::debug!("Book {}: {} committed", id, change.verb()),
            Err(e) => tracing::error!("Book {}: {} rolled back: {}", id, change.verb(), e),
        }
        Ok(())
    }
}
