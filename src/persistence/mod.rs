//! Whole-collection snapshot storage.
//!
//! A [`Repository`] loads and saves an entire collection at once. There are no
//! partial updates: callers mutate a copy in memory and hand the full snapshot
//! back to [`Repository::save_all`].

mod json_file;
mod memory;

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Load-all / save-all access to one persisted collection.
pub trait Repository<T>: Send + Sync {
    /// Returns every stored record in stored order. A missing store is empty.
    fn load_all(&self) -> Result<Vec<T>, PersistenceError>;

    /// Replaces the stored collection with `records`.
    fn save_all(&self, records: &[T]) -> Result<(), PersistenceError>;
}
