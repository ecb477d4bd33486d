//! Error types for change-store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving or reverting file changes.
#[derive(Debug, Error)]
pub enum Error {
    /// The store directory (or a slot's parent directory) could not be created
    #[error("cannot create store directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A target path could not be made absolute
    #[error("cannot resolve path {path}: {source}")]
    Resolve {
        /// Path as given by the caller
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Writing a backup slot or a target file failed
    #[error("cannot write {path}: {source}")]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for change-store operations.
pub type Result<T> = std::result::Result<T, Error>;
