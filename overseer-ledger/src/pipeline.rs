//! Audit pipeline shared by the CLI and tests.
//!
//! One pass, strictly sequential, in dashboard order:
//!
//! 1. Load the project list from the dashboard. Empty → nothing to do.
//! 2. Per project, resolve the declared code path.
//! 3. Path exists locally → scan it and log an `AUDIT` line when the result
//!    is active or idle. Otherwise → log a `SIGNAL` line asking for a report.
//!
//! Failures inside step 2 or 3 are recorded on that project's
//! [`ProjectAudit`] and never stop the loop.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use overseer_core::{registry, Activity, DocumentStore, LogLevel, ProjectName};
use overseer_scanner::{scan_at, ScanReport};

use crate::reconciler::{append_entry, LogOutcome};
use crate::LedgerError;

/// Message logged when a project's activity can't be determined locally.
pub const SIGNAL_MESSAGE: &str = "Manager requested status update.";

/// Options for an audit run.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Compute everything, write nothing.
    pub dry_run: bool,
    /// Restrict the run to one registered project.
    pub only: Option<ProjectName>,
}

/// How a project was audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRoute {
    /// The declared path exists locally and was scanned.
    Local { path: PathBuf, scan: ScanReport },
    /// No usable local path; the owner was asked to report.
    Signal,
}

/// Everything that happened to one project during a run.
#[derive(Debug)]
pub struct ProjectAudit {
    pub project: ProjectName,
    /// Code path declared in the status document, if any.
    pub code_path: Option<String>,
    /// Set when the status document could not be read for a reason other
    /// than being absent. The project then falls through to [`AuditRoute::Signal`].
    pub resolve_error: Option<String>,
    pub route: AuditRoute,
    /// Text of the audit line, when one was attempted.
    pub message: Option<String>,
    /// `None` when nothing was logged (scan found no files or no path).
    pub log: Option<Result<LogOutcome, LedgerError>>,
}

impl ProjectAudit {
    /// Activity classification for this project.
    pub fn activity(&self) -> Activity {
        match &self.route {
            AuditRoute::Local { scan, .. } => scan.activity.clone(),
            AuditRoute::Signal => Activity::NoPath,
        }
    }

    /// `true` if logging was attempted and failed.
    pub fn failed(&self) -> bool {
        matches!(self.log, Some(Err(_)))
    }
}

/// Drives an audit run against a [`DocumentStore`].
pub struct Auditor<S> {
    store: S,
    options: AuditOptions,
    clock: fn() -> DateTime<Local>,
}

impl<S: DocumentStore> Auditor<S> {
    pub fn new(store: S, options: AuditOptions) -> Self {
        Self {
            store,
            options,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for scan ages and log timestamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Registered projects, narrowed to [`AuditOptions::only`] when set.
    pub fn projects(&self) -> Result<Vec<ProjectName>, LedgerError> {
        let mut projects = registry::load_projects(&self.store)?;
        if let Some(only) = &self.options.only {
            projects.retain(|p| p == only);
        }
        Ok(projects)
    }

    /// Audit every registered project in order.
    pub fn run(&self) -> Result<Vec<ProjectAudit>, LedgerError> {
        let projects = self.projects()?;
        Ok(projects.iter().map(|p| self.audit_project(p)).collect())
    }

    /// Resolve, scan and log a single project. Never fails; see [`ProjectAudit`].
    pub fn audit_project(&self, project: &ProjectName) -> ProjectAudit {
        let now = (self.clock)();

        let (code_path, resolve_error) = match registry::resolve_code_path(&self.store, project) {
            Ok(path) => (path, None),
            Err(err) => {
                tracing::warn!(project = %project, error = %err, "status document unreadable");
                (None, Some(err.to_string()))
            }
        };

        let local = code_path
            .as_deref()
            .map(Path::new)
            .filter(|path| path.exists());

        let Some(path) = local else {
            let log = self.log(project, SIGNAL_MESSAGE, LogLevel::Signal, now);
            return ProjectAudit {
                project: project.clone(),
                code_path,
                resolve_error,
                route: AuditRoute::Signal,
                message: Some(SIGNAL_MESSAGE.to_string()),
                log: Some(log),
            };
        };

        let scan = scan_at(path, SystemTime::from(now));
        let message = scan
            .activity
            .is_loggable()
            .then(|| format!("System Scan: {}. {}", scan.activity, scan.detail()));
        let log = message
            .as_deref()
            .map(|message| self.log(project, message, LogLevel::Audit, now));

        ProjectAudit {
            project: project.clone(),
            route: AuditRoute::Local {
                path: path.to_path_buf(),
                scan,
            },
            code_path,
            resolve_error,
            message,
            log,
        }
    }

    fn log(
        &self,
        project: &ProjectName,
        message: &str,
        level: LogLevel,
        now: DateTime<Local>,
    ) -> Result<LogOutcome, LedgerError> {
        let outcome = append_entry(
            &self.store,
            project,
            message,
            level,
            now.naive_local(),
            self.options.dry_run,
        );
        if let Err(err) = &outcome {
            tracing::warn!(project = %project, error = %err, "failed to log audit entry");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use overseer_core::DirStore;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn run_without_dashboard_is_an_error() {
        let data = TempDir::new().expect("data");
        let auditor = Auditor::new(DirStore::new(data.path()), AuditOptions::default());
        assert!(auditor.run().is_err());
    }

    #[test]
    fn empty_dashboard_audits_nothing() {
        let data = TempDir::new().expect("data");
        fs::write(data.path().join("DASHBOARD.md"), "# Dashboard\n").expect("write");
        let auditor = Auditor::new(DirStore::new(data.path()), AuditOptions::default());
        assert!(auditor.run().expect("run").is_empty());
    }

    #[test]
    fn only_filter_narrows_projects() {
        let data = TempDir::new().expect("data");
        fs::write(
            data.path().join("DASHBOARD.md"),
            "| a | **One** |\n| b | **Two** |\n",
        )
        .expect("write");
        let options = AuditOptions {
            dry_run: true,
            only: Some(ProjectName::from("Two")),
        };
        let auditor = Auditor::new(DirStore::new(data.path()), options);
        assert_eq!(auditor.projects().expect("projects"), vec![ProjectName::from("Two")]);
    }

    fn fixed_clock() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2030, 1, 2, 3, 4, 5)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn log_line_uses_injected_clock() {
        let data = TempDir::new().expect("data");
        fs::write(data.path().join("DASHBOARD.md"), "| x | **Ghost** |\n").expect("write");
        let project = data.path().join("projects").join("Ghost");
        fs::create_dir_all(&project).expect("mkdir");
        fs::write(project.join("STATUS.md"), "# Project Status: Ghost\n<!-- LOG_START -->\n")
            .expect("write");

        let auditor = Auditor::new(DirStore::new(data.path()), AuditOptions::default())
            .with_clock(fixed_clock);
        let audits = auditor.run().expect("run");
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].message.as_deref(), Some(SIGNAL_MESSAGE));
        assert!(matches!(audits[0].log, Some(Ok(LogOutcome::Written))));

        let status = fs::read_to_string(project.join("STATUS.md")).expect("read");
        assert!(status.contains(
            "<!-- LOG_START -->\n- `2030-01-02 03:04:05` 🕵️‍♂️ **SIGNAL**: Manager requested status update.\n"
        ));
    }
}
