//! Project registry and status-document extraction.
//!
//! # Storage layout
//!
//! ```text
//! <data repository>/
//!   DASHBOARD.md                 (table of projects)
//!   projects/
//!     <project_name>/
//!       STATUS.md                (audit log, code path row, status heading)
//! ```
//!
//! Both extractors are best-effort line matchers, not Markdown parsers:
//! rows that don't match are skipped, and the first matching code-path row
//! wins. Existing documents rely on that tolerance.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::ProjectName;

/// Path of the dashboard document inside the data repository.
pub const DASHBOARD_PATH: &str = "DASHBOARD.md";

// ---------------------------------------------------------------------------
// 1. Dashboard
// ---------------------------------------------------------------------------

/// Extract project names from the dashboard table, in row order.
///
/// A line qualifies when it contains both `| **` and `** |`. The name is the
/// third `|`-separated field with whitespace and `*` stripped, so
/// `| 🎨 | **Beauty-PK** | … |` yields `Beauty-PK`. Duplicates are kept.
pub fn parse_dashboard(content: &str) -> Vec<ProjectName> {
    content
        .split('\n')
        .filter(|line| line.contains("| **") && line.contains("** |"))
        .filter_map(|line| line.split('|').nth(2))
        .map(|field| ProjectName::from(field.trim().replace('*', "").trim()))
        .collect()
}

/// Fetch [`DASHBOARD_PATH`] from `store` and parse it.
pub fn load_projects<S: DocumentStore + ?Sized>(
    store: &S,
) -> Result<Vec<ProjectName>, StoreError> {
    let doc = store.get_document(DASHBOARD_PATH)?;
    Ok(parse_dashboard(&doc.content))
}

// ---------------------------------------------------------------------------
// 2. Code path
// ---------------------------------------------------------------------------

fn code_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\|\s*\*\*Actual Code Path\*\*\s*\|\s*`([^`]+)`")
            .expect("code path pattern is valid")
    })
}

/// Extract the back-ticked value of the `**Actual Code Path**` row.
///
/// First match wins; the value is trimmed.
pub fn extract_code_path(content: &str) -> Option<String> {
    code_path_pattern()
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Read the project's status document and extract its declared code path.
///
/// A missing status document is `Ok(None)`, the same as a document without
/// the row. Any other store failure is returned so the caller can surface it.
pub fn resolve_code_path<S: DocumentStore + ?Sized>(
    store: &S,
    project: &ProjectName,
) -> Result<Option<String>, StoreError> {
    match store.get_document(&project.status_path()) {
        Ok(doc) => Ok(extract_code_path(&doc.content)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
