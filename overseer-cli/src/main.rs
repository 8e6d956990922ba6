//! Overseer — project activity auditor.
//!
//! # Usage
//!
//! ```text
//! overseer [--repo <owner/name>] [--store-dir <dir>]            (same as `audit`)
//! overseer audit [--project <name>] [--dry-run] [--json]
//! overseer projects [--json]
//! ```
//!
//! The access token is read from `GITHUB_TOKEN`, falling back to a
//! `.gh_token` file in the working directory and then in the home directory.
//! `--store-dir` audits a local checkout instead and needs no token.

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{audit::AuditArgs, projects::ProjectsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "overseer",
    version,
    about = "Audit project activity and log the results into their status documents",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the dashboard and status documents live.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Data repository as `owner/name` (default: $PRIVATE_DATA_REPO or the built-in default).
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Use a local checkout of the data repository instead of the GitHub API.
    #[arg(long, global = true, value_name = "DIR", conflicts_with = "repo")]
    pub store_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan every registered project and append an audit line to its status log.
    Audit(AuditArgs),

    /// List registered projects and their declared code paths.
    Projects(ProjectsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Audit(args)) => args.run(&cli.store),
        Some(Commands::Projects(args)) => args.run(&cli.store),
        None => AuditArgs::default().run(&cli.store),
    }
}

/// Diagnostics go to stderr and stay quiet unless `RUST_LOG` asks for more;
/// stdout carries the progress report.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
