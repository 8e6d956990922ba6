//! Credential and target resolution for the `overseer` binary.
//!
//! This is the only place that reads process-wide state. Library crates get
//! the token and repository passed in explicitly.
//!
//! Every lookup has two forms, as in the registry code:
//! - `fn_at(…)` — explicit inputs; used in tests
//! - `fn(…)` — reads the environment / home directory, delegates to `_at`

use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use overseer_core::{DirStore, DocumentStore};
use overseer_github::GitHubStore;

use crate::StoreArgs;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const REPO_ENV: &str = "PRIVATE_DATA_REPO";
pub const API_BASE_ENV: &str = "OVERSEER_API_BASE";
pub const TOKEN_FILE: &str = ".gh_token";
pub const DEFAULT_REPO: &str = "alstonhuang/my-agent-data";

// ---------------------------------------------------------------------------
// 1. Token
// ---------------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_token_file(dir: &Path) -> Option<String> {
    non_empty(std::fs::read_to_string(dir.join(TOKEN_FILE)).ok())
}

/// Token from `env_value`, else `<cwd>/.gh_token`, else `<home>/.gh_token`.
pub fn resolve_token_at(env_value: Option<String>, cwd: &Path, home: Option<&Path>) -> Option<String> {
    non_empty(env_value)
        .or_else(|| read_token_file(cwd))
        .or_else(|| home.and_then(read_token_file))
}

/// `resolve_token_at` over the real environment.
pub fn resolve_token() -> Result<String> {
    let cwd = env::current_dir().context("could not determine working directory")?;
    let home = dirs::home_dir();
    resolve_token_at(env::var(TOKEN_ENV).ok(), &cwd, home.as_deref()).with_context(|| {
        format!("no {TOKEN_ENV} found (set it, or put the token in ./{TOKEN_FILE})")
    })
}

// ---------------------------------------------------------------------------
// 2. Target
// ---------------------------------------------------------------------------

/// `flag`, else `env_value`, else [`DEFAULT_REPO`].
pub fn resolve_repo_at(flag: Option<String>, env_value: Option<String>) -> String {
    non_empty(flag)
        .or_else(|| non_empty(env_value))
        .unwrap_or_else(|| DEFAULT_REPO.to_string())
}

pub fn resolve_repo(flag: Option<String>) -> String {
    resolve_repo_at(flag, env::var(REPO_ENV).ok())
}

// ---------------------------------------------------------------------------
// 3. Store
// ---------------------------------------------------------------------------

/// An opened document store plus a label for progress output.
pub struct OpenedStore {
    pub store: Box<dyn DocumentStore>,
    pub target: String,
    /// Set when the remote repository could not be reached.
    pub unreachable: Option<String>,
}

/// Open the store selected by `args`.
///
/// A missing token is an error (the process exits non-zero). An unreachable
/// repository is reported through [`OpenedStore::unreachable`] instead.
pub fn open_store(args: &StoreArgs) -> Result<OpenedStore> {
    if let Some(dir) = &args.store_dir {
        if !dir.is_dir() {
            anyhow::bail!("store directory does not exist: {}", dir.display());
        }
        return Ok(OpenedStore {
            store: Box::new(DirStore::new(dir)),
            target: dir.display().to_string(),
            unreachable: None,
        });
    }

    let token = resolve_token()?;
    let repo = resolve_repo(args.repo.clone());
    let mut store = GitHubStore::new(token, repo.clone());
    if let Some(base) = non_empty(env::var(API_BASE_ENV).ok()) {
        store = store.with_api_base(base);
    }
    let unreachable = store.check_access().err().map(|e| e.to_string());

    Ok(OpenedStore {
        store: Box::new(store),
        target: repo,
        unreachable,
    })
}
