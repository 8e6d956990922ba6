//! Error types for overseer-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a [`crate::DocumentStore`] can report.
///
/// `NotFound` is kept apart from the transient variants so callers can treat a
/// missing document as an ordinary outcome and surface everything else.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not exist in the store.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// The document changed since it was read; the write was rejected.
    #[error("version conflict writing {path}: document changed since it was read")]
    Conflict { path: String },

    /// Local I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote store answered with an unexpected status.
    #[error("remote store returned {status} for {path}: {message}")]
    Remote {
        path: String,
        status: u16,
        message: String,
    },

    /// The remote store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The document exists but its payload could not be decoded as UTF-8 text.
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

impl StoreError {
    /// `true` when the error means "the document is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
