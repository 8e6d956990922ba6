//! Error types for overseer-ledger.

use thiserror::Error;

use overseer_core::StoreError;

/// All errors that can arise while reconciling a status log.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An error from the document store (fetch, decode or conditional write).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
