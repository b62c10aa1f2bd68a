//! Error types for the persistence log.

use std::path::PathBuf;

/// Errors that can occur while reading or appending a log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation on a log file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The log file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The username cannot be used to address a log.
    #[error("invalid log owner: {0:?}")]
    InvalidOwner(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
