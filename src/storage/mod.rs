//! Storage backends for the catalog.
//!
//! Three interchangeable backends sit behind [`StorageBackend`]:
//! - [`FileStorage`] - a JSON document on local disk
//! - [`HostedStorage`] - the same document kept in a hosted JSON store
//! - [`RelationalStorage`] - one SQL row per book
//!
//! The first two can only replace the whole collection at once; the
//! relational backend can only change one row at a time. Each backend
//! reports which of the two it supports through [`Capability`], and the
//! catalog service picks its write strategy from that flag.
//!
//! Read failures never surface: backends fall back to an empty collection,
//! an absent record or identity 1, and log what went wrong.

mod collection;
mod file;
mod hosted;
mod relational;

pub use collection::{Change, CollectionState};
pub use file::FileStorage;
pub use hosted::HostedStorage;
pub use relational::RelationalStorage;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageMode};
use crate::error::{Result, ResultExt};
use crate::model::Book;

/// How a backend accepts writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Rewrites the entire collection and counter on every save
    FullCollection,
    /// Inserts, updates and deletes single rows
    RowScoped,
}

/// A place where books are kept.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    /// All stored books plus the next identity.
    async fn load_collection(&self) -> CollectionState;

    /// Identity for the next created book.
    async fn next_identity(&self) -> i64 {
        self.load_collection().await.next_id
    }

    /// Point lookup by identity.
    async fn find_by_id(&self, id: i64) -> Option<Book> {
        self.load_collection().await.find(id).cloned()
    }

    /// Replace the stored collection with `state`.
    async fn apply_full_collection(&self, _state: &CollectionState) -> std::result::Result<(), StorageError> {
        Err(StorageError::Unsupported("bulk overwrite"))
    }

    /// Apply a single-row change.
    async fn apply_delta(&self, _change: &Change) -> std::result::Result<(), StorageError> {
        Err(StorageError::Unsupported("row mutation"))
    }
}

/// Open the backend selected by `config`.
///
/// An unknown storage mode, missing hosted credentials or an unreachable
/// database are startup failures.
pub async fn open(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    let mode = config.storage_mode()?;
    tracing::info!("Using {} storage", mode);

    let backend: Arc<dyn StorageBackend> = match mode {
        StorageMode::File => {
            let storage = FileStorage::new(&config.storage.file_path);
            tracing::debug!("Catalog file: {:?}", storage.path());
            Arc::new(storage)
        }
        StorageMode::Hosted => Arc::new(HostedStorage::from_config(&config.hosted)?),
        StorageMode::Relational => Arc::new(
            RelationalStorage::connect(&config.database)
                .await
                .with_context("connecting to the books database")?,
        ),
    };
    Ok(backend)
}

/// Failures a backend reports to its caller.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Hosted store request failed: {0}")]
    Http(String),

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),
}
