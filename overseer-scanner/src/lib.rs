//! Activity scanning for `overseer-scanner`.
//!
//! `scan(path)` walks a project's working tree, finds the most recently
//! modified file and classifies how long ago that was. Dependency caches,
//! version-control metadata and framework build output are left out.
//!
//! The exclusion test is a substring match against the directory path, not a
//! comparison with the directory's own name. `.github/` is therefore excluded
//! along with `.git/`, and so is everything under a root whose path happens to
//! contain one of the markers. Existing audit logs were produced with this
//! behaviour, so it is kept.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use walkdir::{DirEntry, WalkDir};

use overseer_core::Activity;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Directory path fragments whose contents are never scanned.
pub const EXCLUDED_DIR_MARKERS: [&str; 3] = ["node_modules", ".git", ".next"];

/// Changes younger than this are "active recently".
pub const RECENT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Changes younger than this are "active today".
pub const TODAY_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The most recently modified file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestFile {
    /// File name without its directory (e.g. `"page.tsx"`).
    pub name: String,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Result of scanning one directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub activity: Activity,
    /// `None` for [`Activity::NotFound`] and [`Activity::Empty`].
    pub latest: Option<LatestFile>,
}

impl ScanReport {
    fn without_files(activity: Activity) -> Self {
        Self {
            activity,
            latest: None,
        }
    }

    /// Human-readable secondary line, e.g. `Last edited: page.tsx`.
    pub fn detail(&self) -> String {
        match &self.latest {
            Some(file) => format!("Last edited: {}", file.name),
            None => self.activity.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan `path` against the current time.
pub fn scan(path: &Path) -> ScanReport {
    scan_at(path, SystemTime::now())
}

/// Scan `path`, measuring file ages against `now`.
///
/// Never fails: a missing root is [`Activity::NotFound`], an empty (or fully
/// excluded) tree is [`Activity::Empty`], and unreadable entries are skipped.
pub fn scan_at(path: &Path, now: SystemTime) -> ScanReport {
    if !path.exists() {
        return ScanReport::without_files(Activity::NotFound);
    }
    if is_excluded(path) {
        return ScanReport::without_files(Activity::Empty);
    }

    let walker = WalkDir::new(path)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_excluded(e.path())));

    let mut latest: Option<LatestFile> = None;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let Some(modified) = file_mtime(&entry) else {
            continue;
        };
        // Strictly greater: the first file seen keeps a tie.
        let newer = match &latest {
            Some(best) => modified > best.modified,
            None => true,
        };
        if newer {
            latest = Some(LatestFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                modified,
            });
        }
    }

    match latest {
        Some(file) => ScanReport {
            activity: classify(file.modified, now),
            latest: Some(file),
        },
        None => ScanReport::without_files(Activity::Empty),
    }
}

/// Classify a modification time relative to `now`.
///
/// A timestamp in the future counts as "just now".
pub fn classify(modified: SystemTime, now: SystemTime) -> Activity {
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if age < RECENT_WINDOW {
        Activity::ActiveRecent
    } else if age < TODAY_WINDOW {
        Activity::ActiveToday
    } else {
        Activity::Idle {
            last_edit: DateTime::<Local>::from(modified).date_naive(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_excluded(dir: &Path) -> bool {
    let text = dir.to_string_lossy();
    EXCLUDED_DIR_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// Modification time following symlinks; `None` for directories behind a
/// symlink and for anything unreadable.
fn file_mtime(entry: &DirEntry) -> Option<SystemTime> {
    let meta = match std::fs::metadata(entry.path()) {
        Ok(meta) => meta,
        Err(err) => {
            tracing::debug!(path = %entry.path().display(), error = %err, "skipping file");
            return None;
        }
    };
    if meta.is_dir() {
        return None;
    }
    meta.modified().ok()
}
