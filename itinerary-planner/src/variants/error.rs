//! Variant store error types.

use std::path::PathBuf;

/// Errors that can occur when reading or writing the variant store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the store file failed
    #[error("variant store IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a valid record document
    #[error("variant store at {path:?} is invalid: {message}")]
    Json { path: PathBuf, message: String },

    /// A thread panicked while holding the store
    #[error("variant store lock poisoned")]
    Poisoned,
}
