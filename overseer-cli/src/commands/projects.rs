//! `overseer projects` — list registered projects and their code paths.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use overseer_core::registry;

use crate::config::open_store;
use crate::StoreArgs;

/// Arguments for `overseer projects`.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled, Serialize)]
struct ProjectRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "code path")]
    code_path: String,
    #[tabled(rename = "local")]
    local: bool,
}

impl ProjectsArgs {
    pub fn run(self, store_args: &StoreArgs) -> Result<()> {
        let opened = open_store(store_args)?;
        if let Some(err) = opened.unreachable {
            anyhow::bail!("failed to connect to {}: {err}", opened.target);
        }

        let projects = registry::load_projects(&opened.store)
            .with_context(|| format!("failed to read dashboard from {}", opened.target))?;

        let rows: Vec<ProjectRow> = projects
            .iter()
            .map(|project| {
                let code_path = match registry::resolve_code_path(&opened.store, project) {
                    Ok(path) => path,
                    Err(err) => {
                        tracing::warn!(project = %project, error = %err, "status document unreadable");
                        None
                    }
                };
                ProjectRow {
                    project: project.to_string(),
                    local: code_path.as_deref().is_some_and(|p| Path::new(p).exists()),
                    code_path: code_path.unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize projects JSON")?
            );
            return Ok(());
        }

        if rows.is_empty() {
            println!("No projects registered in {}.", opened.target);
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
