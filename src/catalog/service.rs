//! Catalog service - CRUD over books on top of any storage backend.
//!
//! The service owns two collaborators:
//! - a [`StorageBackend`], chosen at startup
//! - an [`Enricher`], consulted when a book is created or retitled
//!
//! Writes go through [`BookService::persist`], the only place that looks at
//! the backend's [`Capability`]: whole-collection backends get the loaded
//! collection with the change applied, row backends get the change itself.
//!
//! Writes within one process are serialised by a mutex. Separate processes
//! sharing a file or bin can still overwrite each other's changes.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::enrichment::Enricher;
use crate::error::Result;
use crate::model::{Book, BookQuery, BookUpdate, NewBook};
use crate::storage::{Capability, Change, StorageBackend};

/// Book catalog operations
pub struct BookService {
    storage: Arc<dyn StorageBackend>,
    enricher: Arc<dyn Enricher>,
    write_lock: Mutex<()>,
}

impl BookService {
    pub fn new(storage: Arc<dyn StorageBackend>, enricher: Arc<dyn Enricher>) -> Self {
        Self {
            storage,
            enricher,
            write_lock: Mutex::new(()),
        }
    }

    /// Name of the active storage backend
    pub fn storage_name(&self) -> &'static str {
        self.storage.name()
    }

    /// Add a book, enriching it by title.
    ///
    /// Enrichment runs before the write lock is taken so a slow lookup
    /// doesn't hold up other writers.
    pub async fn create(&self, input: NewBook) -> Result<Book> {
        input.validate()?;

        let found = self.enricher.enrich(&input.title).await;

        let _guard = self.write_lock.lock().await;
        let id = self.storage.next_identity().await;
        let mut book = input.into_book(id);
        found.apply_to(&mut book);

        self.persist(Change::Insert(book.clone())).await?;
        tracing::info!("Created book {} {:?}", book.id, book.title);
        Ok(book)
    }

    /// Filtered, paginated listing.
    pub async fn list(&self, query: &BookQuery) -> Vec<Book> {
        let state = self.storage.load_collection().await;
        query.apply(state.books)
    }

    pub async fn get(&self, id: i64) -> Option<Book> {
        self.storage.find_by_id(id).await
    }

    /// Apply a partial update.
    ///
    /// Returns `None` when no book has this id. A new title triggers a
    /// fresh enrichment whose present fields replace the stored ones. The
    /// lookup runs before the write lock is taken; the stored record is
    /// read under the lock so concurrent writers can't lose each other's
    /// fields. The book is written back even when nothing changed.
    pub async fn update(&self, id: i64, changes: BookUpdate) -> Result<Option<Book>> {
        changes.validate()?;

        let found = match changes.new_title() {
            Some(title) => Some(self.enricher.enrich(title).await),
            None => None,
        };

        let _guard = self.write_lock.lock().await;
        let Some(mut book) = self.storage.find_by_id(id).await else {
            tracing::debug!("Update of unknown book {}", id);
            return Ok(None);
        };

        changes.apply_to(&mut book);
        if let Some(found) = found {
            found.apply_to(&mut book);
        }

        self.persist(Change::Update(book.clone())).await?;
        tracing::info!("Updated book {}", id);
        Ok(Some(book))
    }

    /// Remove a book. Returns `false` when no book has this id.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(book) = self.storage.find_by_id(id).await else {
            tracing::debug!("Delete of unknown book {}", id);
            return Ok(false);
        };

        self.persist(Change::Delete(book)).await?;
        tracing::info!("Deleted book {}", id);
        Ok(true)
    }

    /// Write one change using the backend's persistence strategy.
    ///
    /// Callers must hold `write_lock`.
    async fn persist(&self, change: Change) -> Result<()> {
        match self.storage.capability() {
            Capability::FullCollection => {
                let mut state = self.storage.load_collection().await;
                state.apply(&change);
                self.storage.apply_full_collection(&state).await?;
            }
            Capability::RowScoped => self.storage.apply_delta(&change).await?,
        }
        Ok(())
    }
}
