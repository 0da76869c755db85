//! Persistence: key-value backends, write coalescing and versioned envelopes.
//!
//! Stores serialize themselves to JSON and hand the string to a
//! [`ThrottledStorage`], which buffers writes and flushes them to the backend
//! on a single restartable timer.

mod backend;
mod envelope;
mod throttled;

use thiserror::Error;

pub use backend::{FileStore, MemoryStore};
pub use envelope::{load_state, no_migration, save_state};
pub use throttled::ThrottledStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
