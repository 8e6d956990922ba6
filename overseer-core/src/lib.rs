//! Overseer core library — domain types, document stores, registry parsing.
//!
//! Public API surface:
//! - [`types`] — newtypes and the activity classification
//! - [`error`] — [`StoreError`]
//! - [`store`] — the [`DocumentStore`] seam and the local [`DirStore`]
//! - [`registry`] — dashboard and status-document extraction

pub mod error;
pub mod registry;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{DirStore, Document, DocumentStore};
pub use types::{Activity, LogLevel, ProjectName, VersionToken};
