//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`StorageError`], [`ConfigError`], and `EnrichmentError` inside the
//! enrichment module), while the CLI uses `anyhow` for convenient error
//! propagation.
//!
//! Most storage and enrichment failures never reach this type: backends
//! degrade to safe defaults and enrichment degrades to empty results. What
//! remains are validation failures, startup failures and the few write
//! failures a backend chooses to surface.
//!
//! # Example
//!
//! ```ignore
//! use book_catalog::error::{Error, Result, ResultExt};
//!
//! async fn connect(url: &str) -> Result<AnyPool> {
//!     AnyPool::connect(url).await.with_context("connecting to the books database")
//! }
//! ```

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage backend failure that was surfaced to the caller
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Caller input rejected before reaching storage
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
