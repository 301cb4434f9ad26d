//! Storage error handling
//!
//! Typed errors for character store operations, carrying the path that
//! failed where there is one.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the cache directory
    #[error("Failed to create cache directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read the table file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the table file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Table file exists but cannot be parsed
    #[error("Invalid cache format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Table could not be serialized
    #[error("Failed to serialize character table: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A writer panicked while holding the table lock
    #[error("Character store lock poisoned")]
    Poisoned,

    /// The blocking task running a store operation did not complete
    #[error("Store operation did not complete: {0}")]
    Background(String),
}

impl StoreError {
    /// Map an IO error from a write to a specific error type
    pub fn from_write(path: PathBuf, source: io::Error) -> Self {
        StoreError::WriteError { path, source }
    }

    /// Map an IO error from a read to a specific error type
    pub fn from_read(path: PathBuf, source: io::Error) -> Self {
        StoreError::ReadError { path, source }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Background(e.to_string())
    }
}
