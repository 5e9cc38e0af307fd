//! Book catalog: create, read, update and delete with best-effort
//! enrichment, independent of where the books are stored.

mod service;

pub use service::BookService;
