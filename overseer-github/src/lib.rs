//! GitHub contents-API document store.
//!
//! Reads go through `GET /repos/{owner}/{repo}/contents/{path}`, which returns
//! the file base64-encoded together with its blob SHA. The SHA is the version
//! token; `PUT` on the same URL only succeeds while it is still current, and
//! GitHub answers `409 Conflict` otherwise.
//!
//! The store holds its credential explicitly. Nothing here reads the
//! environment; that is the binary's job.

use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use overseer_core::{Document, DocumentStore, StoreError, VersionToken};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("overseer/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`DocumentStore`] over one GitHub repository.
pub struct GitHubStore {
    agent: ureq::Agent,
    token: String,
    repo: String,
    api_base: String,
}

impl GitHubStore {
    /// `repo` is `owner/name`.
    pub fn new(token: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            token: token.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the store at a different API root (GitHub Enterprise, a mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Confirm the repository exists and the token can see it.
    pub fn check_access(&self) -> Result<(), StoreError> {
        let url = format!("{}/repos/{}", self.api_base, self.repo);
        tracing::debug!(%url, "checking repository access");
        self.request("GET", &url)
            .call()
            .map(|_| ())
            .map_err(|err| map_error(&self.repo, err))
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base,
            self.repo,
            encode_path(path)
        )
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION)
    }
}

impl DocumentStore for GitHubStore {
    fn get_document(&self, path: &str) -> Result<Document, StoreError> {
        let url = self.contents_url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .request("GET", &url)
            .call()
            .map_err(|err| map_error(path, err))?;
        let body: ContentsResponse = response.into_json().map_err(|e| StoreError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let content = decode_content(path, &body)?;
        Ok(Document {
            path: path.to_string(),
            content,
            version: VersionToken(body.sha),
        })
    }

    fn write_document(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: &VersionToken,
    ) -> Result<(), StoreError> {
        let url = self.contents_url(path);
        tracing::debug!(%url, sha = %expected, "PUT");
        let payload = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(content),
            "sha": expected.0,
        });
        self.request("PUT", &url)
            .send_json(payload)
            .map(|_| ())
            .map_err(|err| map_error(path, err))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Percent-encode each segment of a repository path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn decode_content(path: &str, body: &ContentsResponse) -> Result<String, StoreError> {
    let decode_err = |message: String| StoreError::Decode {
        path: path.to_string(),
        message,
    };

    match body.encoding.as_deref() {
        Some("base64") => {}
        other => {
            return Err(decode_err(format!(
                "unsupported content encoding {other:?} (file too large or not a file)"
            )))
        }
    }

    let raw: String = body
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| decode_err(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| decode_err(e.to_string()))
}

fn map_error(path: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            map_status(path, code, &body)
        }
        ureq::Error::Transport(transport) => StoreError::Transport(transport.to_string()),
    }
}

fn map_status(path: &str, status: u16, body: &str) -> StoreError {
    match status {
        404 => StoreError::NotFound {
            path: path.to_string(),
        },
        409 | 412 => StoreError::Conflict {
            path: path.to_string(),
        },
        _ => StoreError::Remote {
            path: path.to_string(),
            status,
            message: serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.message)
                .unwrap_or_else(|_| body.trim().to_string()),
        },
    }
}
