//! Changelog output types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A display section of a generated changelog.
///
/// `heading` is the category line as the model wrote it (e.g. `## Features:`);
/// `lines` are the body lines that followed it, trimmed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.lines.is_empty()
    }

    /// Heading text with markdown markers and trailing colon removed.
    ///
    /// `"## Features:"` becomes `"Features"`.
    pub fn title(&self) -> Option<&str> {
        self.heading.as_deref().map(|h| {
            h.trim_start_matches('#')
                .trim()
                .trim_end_matches(':')
                .trim()
        })
    }
}

/// Failure class of an unsuccessful changelog run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or malformed input.
    Validation,
    /// Missing or rejected credential (generation service or GitHub).
    Auth,
    /// Repository not found, bad revision range, rate limited, bad URL.
    Source,
    /// Network or service fault on an external call.
    UpstreamUnavailable,
    /// The generation service answered with blank text.
    EmptyResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::Source => write!(f, "source"),
            ErrorKind::UpstreamUnavailable => write!(f, "upstream_unavailable"),
            ErrorKind::EmptyResponse => write!(f, "empty_response"),
        }
    }
}

/// Outcome of one changelog invocation.
///
/// Built once per call and handed to the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_count: Option<usize>,
    /// Commits dropped from the prompt to respect the input limit.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub omitted_commits: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ChangelogResult {
    /// A successful run.
    pub fn generated(notes: String, sections: Vec<Section>, commit_count: usize, omitted: usize) -> Self {
        let warning = (omitted > 0).then(|| {
            format!(
                "{omitted} of {commit_count} commit(s) were omitted to fit the generation input limit; \
                 the oldest commits were dropped"
            )
        });
        Self {
            success: true,
            notes: Some(notes),
            sections,
            error: None,
            error_kind: None,
            commit_count: Some(commit_count),
            omitted_commits: omitted,
            warning,
        }
    }

    /// A failed run. `commit_count` is known when commits were collected before the failure.
    pub fn failed(kind: ErrorKind, message: impl Into<String>, commit_count: Option<usize>) -> Self {
        Self {
            success: false,
            notes: None,
            sections: Vec::new(),
            error: Some(message.into()),
            error_kind: Some(kind),
            commit_count,
            omitted_commits: 0,
            warning: None,
        }
    }
}
