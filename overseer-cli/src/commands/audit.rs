//! `overseer audit` — scan registered projects and log the results.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use overseer_core::{registry::DASHBOARD_PATH, ProjectName};
use overseer_ledger::{
    pipeline::AuditRoute, reconciler::AUDIT_ICON, AuditOptions, Auditor, LogOutcome, ProjectAudit,
};

use crate::config::open_store;
use crate::StoreArgs;

/// Arguments for `overseer audit`.
#[derive(Args, Debug, Default)]
pub struct AuditArgs {
    /// Audit only this registered project.
    #[arg(long)]
    pub project: Option<String>,

    /// Show what would be logged without writing any status document.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a machine-readable JSON report instead of progress output.
    #[arg(long)]
    pub json: bool,
}

impl AuditArgs {
    pub fn run(self, store_args: &StoreArgs) -> Result<()> {
        let opened = open_store(store_args)?;
        let quiet = self.json;

        if !quiet {
            println!("{AUDIT_ICON} Audit starting... (Target: {})", opened.target);
        }
        if let Some(err) = opened.unreachable {
            report_failure(
                quiet,
                &format!("{} Failed to connect to {}: {err}", "❌".red(), opened.target),
            );
            return Ok(());
        }

        let only = self.project.map(ProjectName::from);
        let options = AuditOptions {
            dry_run: self.dry_run,
            only: only.clone(),
        };
        let auditor = Auditor::new(opened.store, options);

        let projects = match auditor.projects() {
            Ok(projects) => projects,
            Err(err) => {
                report_failure(quiet, &format!("{} Failed to read Dashboard: {err}", "❌".red()));
                return Ok(());
            }
        };

        if let Some(only) = only.as_ref().filter(|_| projects.is_empty()) {
            let line = format!("{} {only} is not listed in {DASHBOARD_PATH}", "⚠️".yellow());
            if quiet {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }

        if !quiet {
            let names: Vec<&str> = projects.iter().map(|p| p.0.as_str()).collect();
            println!("📋 Found {} projects: {}", projects.len(), names.join(", "));
        }

        let mut audits = Vec::with_capacity(projects.len());
        for project in &projects {
            if !quiet {
                println!("\n🔍 Auditing {project}...");
            }
            let audit = auditor.audit_project(project);
            if !quiet {
                print_progress(&audit);
            }
            audits.push(audit);
        }

        if quiet {
            print_json(&audits)?;
        } else if !audits.is_empty() {
            print_summary(&audits, self.dry_run);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

fn print_progress(audit: &ProjectAudit) {
    if let Some(err) = &audit.resolve_error {
        println!("   {} Could not read status document: {err}", "⚠️".yellow());
    }

    match &audit.route {
        AuditRoute::Local { path, scan } => {
            println!("   🏠 Local Path: {}", path.display());
            println!("   📊 Result: {} ({})", scan.activity, scan.detail());
        }
        AuditRoute::Signal => println!("   ☁️ Remote/Unknown Path. Sending Signal..."),
    }

    let project = &audit.project;
    match &audit.log {
        None => {}
        Some(Ok(LogOutcome::Written)) => match &audit.message {
            Some(message) => println!("   {} Logged to {project}: {message}", "✅".green()),
            None => println!("   {} Logged to {project}", "✅".green()),
        },
        Some(Ok(LogOutcome::WouldWrite { diff })) => {
            println!("   [dry-run] would log to {project}:");
            for line in diff.lines() {
                println!("      {line}");
            }
        }
        Some(Ok(LogOutcome::Unchanged)) => println!("   · {project} unchanged"),
        Some(Ok(LogOutcome::MarkerNotFound)) => {
            println!("   {} Marker not found in {project}", "⚠️".yellow());
        }
        Some(Err(err)) => println!("   {} Failed to log to {project}: {err}", "❌".red()),
    }
}

/// Progress text goes to stdout, except in JSON mode where stdout carries an
/// empty report and the text moves to stderr.
fn report_failure(json: bool, line: &str) {
    if json {
        eprintln!("{line}");
        println!("[]");
    } else {
        println!("{line}");
    }
}

fn log_label(audit: &ProjectAudit) -> String {
    match &audit.log {
        None => "not logged".to_string(),
        Some(Ok(LogOutcome::Written)) => "logged".to_string(),
        Some(Ok(LogOutcome::WouldWrite { .. })) => "would log".to_string(),
        Some(Ok(LogOutcome::Unchanged)) => "unchanged".to_string(),
        Some(Ok(LogOutcome::MarkerNotFound)) => "marker not found".to_string(),
        Some(Err(err)) => format!("failed: {err}"),
    }
}

fn route_label(route: &AuditRoute) -> &'static str {
    match route {
        AuditRoute::Local { .. } => "local",
        AuditRoute::Signal => "signal",
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "route")]
    route: &'static str,
    #[tabled(rename = "activity")]
    activity: String,
    #[tabled(rename = "log")]
    log: String,
}

fn print_summary(audits: &[ProjectAudit], dry_run: bool) {
    let failed = audits.iter().filter(|a| a.failed()).count();
    let rows: Vec<SummaryRow> = audits
        .iter()
        .map(|a| SummaryRow {
            project: a.project.to_string(),
            route: route_label(&a.route),
            activity: a.activity().to_string(),
            log: log_label(a),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!("\n{prefix}{} projects audited, {failed} failed", audits.len());
    println!("{table}");
}

#[derive(Serialize)]
struct AuditJson {
    project: String,
    route: &'static str,
    code_path: Option<String>,
    activity: &'static str,
    status: String,
    detail: Option<String>,
    message: Option<String>,
    log: String,
}

fn print_json(audits: &[ProjectAudit]) -> Result<()> {
    let payload: Vec<AuditJson> = audits
        .iter()
        .map(|a| {
            let activity = a.activity();
            let detail = match &a.route {
                AuditRoute::Local { scan, .. } => Some(scan.detail()),
                AuditRoute::Signal => None,
            };
            AuditJson {
                project: a.project.to_string(),
                route: route_label(&a.route),
                code_path: a.code_path.clone(),
                activity: activity.key(),
                status: activity.to_string(),
                detail,
                message: a.message.clone(),
                log: log_label(a),
            }
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize audit JSON")?
    );
    Ok(())
}
