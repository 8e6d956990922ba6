//! # overseer-ledger
//!
//! Status-log reconciliation and the audit pipeline.
//!
//! Call [`append_entry`] to add one audit line to a project's status
//! document, or drive a whole registry with [`pipeline::Auditor`].

pub mod error;
pub mod pipeline;
pub mod reconciler;

pub use error::LedgerError;
pub use pipeline::{AuditOptions, Auditor, ProjectAudit};
pub use reconciler::{append_entry, apply_entry, format_entry, LogOutcome};
