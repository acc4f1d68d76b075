//! Repository references and source query parameters.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Owner/name pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Read-only projection of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Parameters for reading history from a local work tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalQuery {
    pub path: PathBuf,
    /// Exclusive lower bound. Unset means "from the root commit".
    pub from_ref: Option<String>,
    pub to_ref: String,
    /// Maximum number of commits to read. `None` reads the whole range.
    pub limit: Option<usize>,
}

impl LocalQuery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            from_ref: None,
            to_ref: "HEAD".to_string(),
            limit: None,
        }
    }

    /// Human-readable range, e.g. `v1.0.0..HEAD`.
    pub fn range_label(&self) -> String {
        match &self.from_ref {
            Some(from) => format!("{from}..{}", self.to_ref),
            None => self.to_ref.clone(),
        }
    }
}

/// Parameters for reading history from the hosted API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteQuery {
    /// ISO-8601 lower bound (inclusive).
    pub since: Option<String>,
    /// ISO-8601 upper bound (inclusive).
    pub until: Option<String>,
    /// Result ceiling. `None` uses the configured default.
    pub limit: Option<usize>,
}
