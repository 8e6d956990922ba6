//! Domain types for the Overseer audit run.
//!
//! Nothing here is persisted as structured data: projects and activity only
//! ever reach the store as rendered Markdown lines.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Display name of a project as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl ProjectName {
    /// `projects/<name>/STATUS.md` — the project's status document path.
    pub fn status_path(&self) -> String {
        format!("projects/{}/STATUS.md", self.0)
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque document version (a blob SHA, an ETag, a content digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionToken(pub String);

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for VersionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VersionToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Severity written into an audit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Result of a local filesystem scan.
    #[default]
    Audit,
    /// Activity could not be determined locally; the owner is asked to report.
    Signal,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Audit => "AUDIT",
            LogLevel::Signal => "SIGNAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recency classification of a project's local working tree.
///
/// Recomputed on every run from filesystem timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    /// The status document declares no usable local path.
    NoPath,
    /// Most recent change is less than one hour old.
    ActiveRecent,
    /// Most recent change is less than one day old.
    ActiveToday,
    /// Nothing changed in the last day.
    Idle { last_edit: NaiveDate },
    /// The declared path does not exist.
    NotFound,
    /// The path exists but holds no (non-excluded) files.
    Empty,
}

impl Activity {
    /// Whether this classification is written to the status log.
    ///
    /// Only active and idle outcomes are logged; the failure-like ones are
    /// reported to the operator and nothing more.
    pub fn is_loggable(&self) -> bool {
        matches!(
            self,
            Activity::ActiveRecent | Activity::ActiveToday | Activity::Idle { .. }
        )
    }

    /// Short machine-readable key, used in JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Activity::NoPath => "no_path",
            Activity::ActiveRecent => "active_recent",
            Activity::ActiveToday => "active_today",
            Activity::Idle { .. } => "idle",
            Activity::NotFound => "not_found",
            Activity::Empty => "empty",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::NoPath => f.write_str("☁️ Remote/Unknown Path"),
            Activity::ActiveRecent => f.write_str("🔥 Active (files changed < 1h ago)"),
            Activity::ActiveToday => f.write_str("🟢 Active (files changed today)"),
            Activity::Idle { last_edit } => {
                write!(f, "💤 Idle (Last edit: {})", last_edit.format("%Y-%m-%d"))
            }
            Activity::NotFound => f.write_str("❌ Path not found"),
            Activity::Empty => f.write_str("No files found"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ProjectName::from("Beauty-PK").to_string(), "Beauty-PK");
        assert_eq!(VersionToken::from("abc123").to_string(), "abc123");
    }

    #[test]
    fn status_path_is_under_projects() {
        assert_eq!(
            ProjectName::from("Beauty-PK").status_path(),
            "projects/Beauty-PK/STATUS.md"
        );
    }

    #[test]
    fn log_level_defaults_to_audit() {
        assert_eq!(LogLevel::default(), LogLevel::Audit);
        assert_eq!(LogLevel::Signal.to_string(), "SIGNAL");
    }

    #[test]
    fn activity_messages_are_stable() {
        assert_eq!(
            Activity::ActiveRecent.to_string(),
            "🔥 Active (files changed < 1h ago)"
        );
        assert_eq!(
            Activity::ActiveToday.to_string(),
            "🟢 Active (files changed today)"
        );
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        assert_eq!(
            Activity::Idle { last_edit: date }.to_string(),
            "💤 Idle (Last edit: 2024-03-09)"
        );
    }

    #[test]
    fn only_active_and_idle_are_loggable() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        assert!(Activity::ActiveRecent.is_loggable());
        assert!(Activity::ActiveToday.is_loggable());
        assert!(Activity::Idle { last_edit: date }.is_loggable());
        assert!(!Activity::NotFound.is_loggable());
        assert!(!Activity::Empty.is_loggable());
        assert!(!Activity::NoPath.is_loggable());
    }
}
