//! Document store seam.
//!
//! The audit run only ever needs two operations from wherever the project
//! documents live: read a document together with its current version, and
//! write a new revision conditional on that version still being current.
//!
//! [`DirStore`] implements the seam over a local checkout of the data
//! repository. Its version token is the SHA-256 of the file content, so an
//! intervening edit on disk is detected the same way a remote blob SHA would be.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, StoreError};
use crate::types::VersionToken;

/// A read snapshot of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub content: String,
    pub version: VersionToken,
}

/// Read/write access to the project documents.
pub trait DocumentStore {
    /// Fetch `path`. Returns [`StoreError::NotFound`] when it does not exist.
    fn get_document(&self, path: &str) -> Result<Document, StoreError>;

    /// Replace `path` with `content`, but only if its current version is still
    /// `expected`. Returns [`StoreError::Conflict`] otherwise.
    fn write_document(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: &VersionToken,
    ) -> Result<(), StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn get_document(&self, path: &str) -> Result<Document, StoreError> {
        (**self).get_document(path)
    }

    fn write_document(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: &VersionToken,
    ) -> Result<(), StoreError> {
        (**self).write_document(path, content, message, expected)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn get_document(&self, path: &str) -> Result<Document, StoreError> {
        (**self).get_document(path)
    }

    fn write_document(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: &VersionToken,
    ) -> Result<(), StoreError> {
        (**self).write_document(path, content, message, expected)
    }
}

// ---------------------------------------------------------------------------
// DirStore
// ---------------------------------------------------------------------------

/// Document store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store path below the root. Absolute paths and `..` are refused.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io_err(
                relative,
                std::io::Error::new(ErrorKind::InvalidInput, "path escapes the store root"),
            ));
        }
        Ok(self.root.join(relative))
    }

    fn read(&self, path: &str) -> Result<(PathBuf, String), StoreError> {
        let full = self.resolve(path)?;
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok((full, content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Err(err) if err.kind() == ErrorKind::InvalidData => Err(StoreError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }),
            Err(err) => Err(io_err(full, err)),
        }
    }
}

/// SHA-256 hex digest of `content`, used as the [`DirStore`] version token.
pub fn content_version(content: &str) -> VersionToken {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    VersionToken(hex::encode(h.finalize()))
}

impl DocumentStore for DirStore {
    fn get_document(&self, path: &str) -> Result<Document, StoreError> {
        let (_, content) = self.read(path)?;
        Ok(Document {
            path: path.to_string(),
            version: content_version(&content),
            content,
        })
    }

    /// Write flow: re-read and compare digests → `.overseer.tmp` sibling → `rename`.
    fn write_document(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: &VersionToken,
    ) -> Result<(), StoreError> {
        let (full, current) = match self.read(path) {
            Ok(found) => found,
            // Deleted since it was read: the precondition cannot hold.
            Err(StoreError::NotFound { path }) => return Err(StoreError::Conflict { path }),
            Err(err) => return Err(err),
        };
        if content_version(&current) != *expected {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        let tmp = PathBuf::from(format!("{}.overseer.tmp", full.display()));
        std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &full) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&full, e));
        }

        tracing::debug!(path = %full.display(), commit = message, "document written");
        Ok(())
    }
}
