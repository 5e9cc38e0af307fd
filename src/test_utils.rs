//! Test utilities and fixtures for book-catalog tests.
//!
//! This module provides common test helpers, fixture books, temporary
//! storage backends and a tiny stub HTTP server to reduce boilerplate in
//! tests.
//!
//! # Example
//!
//! ```ignore
//! use book_catalog::test_utils::{temp_file_storage, sample_book};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (_dir, storage) = temp_file_storage();
//!     let book = sample_book(1);
//!     // ... test logic
//! }
//! ```

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use crate::config::DatabaseConfig;
use crate::model::{Availability, Book, NewBook};
use crate::storage::{FileStorage, RelationalStorage};

/// Input for the canonical test book.
pub fn dune() -> NewBook {
    NewBook {
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        publication_year: 1965,
        genre: "Sci-Fi".to_string(),
        pages: 412,
        availability: None,
    }
}

/// A stored copy of [`dune`] under the given identity.
pub fn sample_book(id: i64) -> Book {
    Book {
        id,
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        publication_year: 1965,
        genre: "Sci-Fi".to_string(),
        pages: 412,
        availability: Availability::Available,
        cover_url: None,
        description: None,
        rating: None,
    }
}

/// Creates a file backend inside a fresh temporary directory.
///
/// The file itself is not created. Keep the `TempDir` alive for the
/// duration of the test.
pub fn temp_file_storage() -> (TempDir, FileStorage) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::new(dir.path().join("books.json"));
    (dir, storage)
}

/// Creates a relational backend on a temporary SQLite database.
///
/// Migrations are run automatically.
pub async fn temp_relational_storage() -> (TempDir, RelationalStorage) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: Some(format!("sqlite:{}?mode=rwc", dir.path().join("books.db").display())),
        ..Default::default()
    };
    let storage = RelationalStorage::connect(&config)
        .await
        .expect("Failed to open test database");
    (dir, storage)
}

// ============================================================================
// Stub HTTP server
// ============================================================================

/// A request as seen by a [`StubServer`] handler.
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response returned by a handler.
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Local HTTP server answering every request through a closure.
///
/// Runs on its own thread and stops when dropped.
pub struct StubServer {
    base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    pub fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub server");
        let base_url = format!("http://{}", server.server_addr());
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                let url = request.url().to_string();
                let (path, query) = match url.split_once('?') {
                    Some((path, query)) => (path.to_string(), query.to_string()),
                    None => (url, String::new()),
                };
                let stub_request = StubRequest {
                    method: request.method().to_string(),
                    path,
                    query,
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.as_str().to_string()))
                        .collect(),
                    body,
                };

                let reply = handler(&stub_request);
                let content_type =
                    tiny_http::Header::from_bytes("Content-Type", "application/json").expect("static header");
                let _ = request.respond(
                    tiny_http::Response::from_string(reply.body)
                        .with_status_code(reply.status)
                        .with_header(content_type),
                );
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// `http://127.0.0.1:<port>`, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
