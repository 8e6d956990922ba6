//! Status-log reconciler.
//!
//! ## `append_entry` — 5-step protocol
//!
//! 1. Read `projects/<name>/STATUS.md` and its version token.
//! 2. Render the audit line.
//! 3. Patch: insert the line directly below [`LOG_MARKER`]; for
//!    [`LogLevel::Signal`] also place [`SIGNAL_BANNER`] above
//!    [`STATUS_HEADING`] unless the banner is already there.
//! 4. Compare with the original → skip if identical.
//! 5. Conditional write using the token from step 1.
//!
//! The marker and heading strings are shared with documents that already
//! exist and must stay byte-for-byte identical.

use chrono::NaiveDateTime;
use similar::TextDiff;

use overseer_core::{DocumentStore, LogLevel, ProjectName};

use crate::error::LedgerError;

/// Insertion point for audit lines.
pub const LOG_MARKER: &str = "<!-- LOG_START -->";

/// Heading the signal banner is anchored to.
pub const STATUS_HEADING: &str = "# Project Status:";

/// Banner placed above the status heading when a report is requested.
pub const SIGNAL_BANNER: &str = "## 🔔 PENDING REQUEST: Please Report Status!";

/// Glyph prefixed to every audit line and commit message (🕵️‍♂️).
pub const AUDIT_ICON: &str = "\u{1F575}\u{FE0F}\u{200D}\u{2642}\u{FE0F}";

/// `strftime` layout of the audit line timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Log outcome
// ---------------------------------------------------------------------------

/// Outcome of reconciling one status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// The patched document was written back.
    Written,
    /// Dry run: the document *would* have been written; carries a unified diff.
    WouldWrite { diff: String },
    /// The patch produced no change, nothing was written.
    Unchanged,
    /// The document has no [`LOG_MARKER`]; it was left untouched.
    MarkerNotFound,
}

// ---------------------------------------------------------------------------
// Pure patching
// ---------------------------------------------------------------------------

/// Render one audit line: ``- `2024-05-01 09:30:00` 🕵️‍♂️ **AUDIT**: message``.
pub fn format_entry(at: NaiveDateTime, level: LogLevel, message: &str) -> String {
    format!(
        "- `{}` {AUDIT_ICON} **{level}**: {message}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Insert `entry` below the marker of `content`.
///
/// Returns `None` when the marker is missing. Only the first marker and the
/// first status heading are touched.
pub fn apply_entry(content: &str, entry: &str, level: LogLevel) -> Option<String> {
    if !content.contains(LOG_MARKER) {
        return None;
    }

    let mut patched = content.replacen(LOG_MARKER, &format!("{LOG_MARKER}\n{entry}"), 1);

    if level == LogLevel::Signal && !patched.contains(SIGNAL_BANNER) {
        patched = patched.replacen(
            STATUS_HEADING,
            &format!("{SIGNAL_BANNER}\n\n{STATUS_HEADING}"),
            1,
        );
    }

    Some(patched)
}

/// Commit message used for audit writes.
pub fn commit_message(project: &ProjectName) -> String {
    format!("{AUDIT_ICON} Audit: {project}")
}

fn unified_diff(path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .context_radius(3)
        .to_string()
}

// ---------------------------------------------------------------------------
// append_entry
// ---------------------------------------------------------------------------

/// Append one audit line to `project`'s status document.
///
/// The write is conditional on the version read at the start; a concurrent
/// edit surfaces as [`overseer_core::StoreError::Conflict`].
pub fn append_entry<S: DocumentStore + ?Sized>(
    store: &S,
    project: &ProjectName,
    message: &str,
    level: LogLevel,
    at: NaiveDateTime,
    dry_run: bool,
) -> Result<LogOutcome, LedgerError> {
    // Step 1: read.
    let path = project.status_path();
    let doc = store.get_document(&path)?;

    // Steps 2–3: render and patch.
    let entry = format_entry(at, level, message);
    let Some(patched) = apply_entry(&doc.content, &entry, level) else {
        tracing::warn!(project = %project, "log marker not found");
        return Ok(LogOutcome::MarkerNotFound);
    };

    // Step 4: skip identical content.
    if patched == doc.content {
        tracing::debug!("unchanged: {path}");
        return Ok(LogOutcome::Unchanged);
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {path}");
        return Ok(LogOutcome::WouldWrite {
            diff: unified_diff(&path, &doc.content, &patched),
        });
    }

    // Step 5: conditional write.
    store.write_document(&path, &patched, &commit_message(project), &doc.version)?;
    tracing::info!("wrote: {path}");
    Ok(LogOutcome::Written)
}
