//! JSON document on local disk.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Capability, CollectionState, StorageBackend, StorageError};

/// Keeps the whole catalog in one JSON file.
///
/// A missing, unreadable or malformed file reads as an empty catalog. Saves
/// rewrite the file completely, going through a sibling temp file so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn capability(&self) -> Capability {
        Capability::FullCollection
    }

    async fn load_collection(&self) -> CollectionState {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No catalog file at {:?}, starting empty", self.path);
                return CollectionState::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", self.path, e);
                return CollectionState::default();
            }
        };

        match serde_json::from_str::<CollectionState>(&contents) {
            Ok(mut state) => {
                state.normalize();
                state
            }
            Err(e) => {
                tracing::warn!("Malformed catalog file {:?}: {}", self.path, e);
                CollectionState::default()
            }
        }
    }

    async fn apply_full_collection(&self, state: &CollectionState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!("Saved {} books to {:?}", state.books.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Change;
    use crate::test_utils::{sample_book, temp_file_storage};

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (_dir, storage) = temp_file_storage();
        let state = storage.load_collection().await;
        assert_eq!(state, CollectionState::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty() {
        let (_dir, storage) = temp_file_storage();
        std::fs::write(storage.path(), "{ not json").unwrap();

        let state = storage.load_collection().await;
        assert!(state.books.is_empty());
        assert_eq!(state.next_id, 1);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_dir, storage) = temp_file_storage();
        let mut state = CollectionState::default();
        state.apply(&Change::Insert(sample_book(1)));
        state.apply(&Change::Insert(sample_book(2)));

        storage.apply_full_collection(&state).await.unwrap();

        let loaded = storage.load_collection().await;
        assert_eq!(loaded, state);
        assert_eq!(storage.next_identity().await, 3);
        assert_eq!(storage.find_by_id(2).await, Some(sample_book(2)));
        assert_eq!(storage.find_by_id(7).await, None);
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_temp_file() {
        let (dir, _) = temp_file_storage();
        let storage = FileStorage::new(dir.path().join("nested").join("books.json"));

        storage
            .apply_full_collection(&CollectionState::default())
            .await
            .unwrap();

        assert!(storage.path().exists());
        assert!(!storage.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let (dir, _) = temp_file_storage();
        // A directory where the file should be cannot be replaced by rename
        let blocked = dir.path().join("books.json");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();

        let result = FileStorage::new(&blocked)
            .apply_full_collection(&CollectionState::default())
            .await;
        assert!(matches!(result, Err(StorageError::Io { .. })));
    }

    #[tokio::test]
    async fn test_rows_are_not_supported() {
        let (_dir, storage) = temp_file_storage();
        let result = storage.apply_delta(&Change::Insert(sample_book(1))).await;
        assert!(matches!(result, Err(StorageError::Unsupported(_))));
    }
}
