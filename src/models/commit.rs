//! Commit record types shared by every source adapter.

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_AUTHOR;

/// One observed commit, normalized across sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Short commit identifier. Absent for pasted free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Commit subject and body.
    pub message: String,
    /// Display name or handle, `"Unknown"` when the source has none.
    #[serde(default = "unknown_author")]
    pub author: String,
    /// ISO-8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Web link to the commit (hosted sources only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn unknown_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl CommitRecord {
    /// A record carrying only a message, as produced from pasted text.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            hash: None,
            message: message.into(),
            author: unknown_author(),
            date: None,
            url: None,
        }
    }

    /// First non-blank line of the message.
    pub fn subject(&self) -> &str {
        self.message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Input to a single generation call.
///
/// `from_ref` / `to_ref` are labels only: they appear in the prompt header
/// and in logs, and are never resolved against a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogRequest {
    pub commits: Vec<CommitRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_ref: Option<String>,
}

impl ChangelogRequest {
    pub fn new(commits: Vec<CommitRecord>) -> Self {
        Self {
            commits,
            from_ref: None,
            to_ref: None,
        }
    }

    pub fn with_range(mut self, from_ref: Option<String>, to_ref: Option<String>) -> Self {
        self.from_ref = from_ref;
        self.to_ref = to_ref;
        self
    }
}
