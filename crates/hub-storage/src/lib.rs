//! Session persistence for the Skills Hub client.
//!
//! A single durable slot holds the serialized current user profile; it
//! survives process restarts on one machine but is never shared across
//! devices. The backend is abstracted behind [`ProfileStorage`] so tests
//! can substitute an in-memory map.

mod file;
mod keys;
mod slot;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use slot::SessionSlot;
pub use traits::ProfileStorage;

use std::path::Path;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend failure (filesystem or platform store)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a session slot backed by durable file storage under `dir`.
pub fn create_session_slot(dir: &Path) -> StorageResult<SessionSlot> {
    let storage = FileStorage::new(dir.to_path_buf())?;
    Ok(SessionSlot::new(Box::new(storage)))
}
