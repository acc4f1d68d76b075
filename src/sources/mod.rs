//! Commit source adapters.
//!
//! Three origins share one contract: a [`SourceConfig`] goes in, an ordered
//! `Vec<CommitRecord>` (newest first) or a [`SourceError`] comes out.

pub mod github;
pub mod local;
pub mod pasted;
pub mod url;
pub mod window;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{CommitRecord, ErrorKind, LocalQuery, RemoteQuery, RepoRef};
use crate::normalize::ValidationError;

pub use github::GithubClient;
pub use window::DateWindow;

/// Errors from the source adapters.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("not a git repository: {}", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("invalid revision range: '{0}' does not resolve to a commit")]
    InvalidRange(String),

    #[error("git failed: {0}")]
    Git(String),

    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    #[error("repository not found or not accessible: {0}")]
    NotFound(String),

    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("invalid GitHub repository URL: '{0}'")]
    InvalidUrl(String),

    #[error("GitHub API unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SourceError {
    /// Failure class reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Auth(_) => ErrorKind::Auth,
            SourceError::Unavailable(_) => ErrorKind::UpstreamUnavailable,
            SourceError::Validation(_) => ErrorKind::Validation,
            SourceError::RepositoryNotFound(_)
            | SourceError::InvalidRange(_)
            | SourceError::Git(_)
            | SourceError::NotFound(_)
            | SourceError::RateLimited(_)
            | SourceError::InvalidUrl(_) => ErrorKind::Source,
        }
    }
}

/// Where to read commits from.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// Free-text log, one commit per line.
    Pasted(String),
    /// A local git work tree.
    Local(LocalQuery),
    /// A GitHub repository. `credential` is the access token, if any.
    Remote {
        credential: Option<String>,
        repo: RepoRef,
        query: RemoteQuery,
    },
}

impl SourceConfig {
    /// Short description for logs and report titles.
    pub fn label(&self) -> String {
        match self {
            SourceConfig::Pasted(_) => "pasted log".to_string(),
            SourceConfig::Local(query) => {
                format!("{} ({})", query.path.display(), query.range_label())
            }
            SourceConfig::Remote { repo, .. } => format!("github.com/{repo}"),
        }
    }

    /// Read the commits this source describes.
    ///
    /// `github` is only used by [`SourceConfig::Remote`].
    pub async fn fetch(&self, github: &GithubClient) -> Result<Vec<CommitRecord>, SourceError> {
        match self {
            SourceConfig::Pasted(text) => Ok(pasted::read(text)?),
            SourceConfig::Local(query) => local::read(query).await,
            SourceConfig::Remote {
                credential,
                repo,
                query,
            } => {
                github
                    .fetch_commits(credential.as_deref(), repo, query)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(SourceError::Auth("x".into()).kind(), ErrorKind::Auth);
        assert_eq!(
            SourceError::Unavailable("x".into()).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(SourceError::NotFound("x".into()).kind(), ErrorKind::Source);
        assert_eq!(SourceError::RateLimited("x".into()).kind(), ErrorKind::Source);
        assert_eq!(
            SourceError::from(ValidationError::NoCommits).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn labels() {
        let remote = SourceConfig::Remote {
            credential: None,
            repo: RepoRef::new("acme", "widgets"),
            query: RemoteQuery::default(),
        };
        assert_eq!(remote.label(), "github.com/acme/widgets");
        assert_eq!(SourceConfig::Pasted(String::new()).label(), "pasted log");
    }

    #[tokio::test]
    async fn pasted_fetch_needs_no_network() {
        let github = GithubClient::new("http://127.0.0.1:9", 100);
        let records = SourceConfig::Pasted("feat: a\nfix: b\n".into())
            .fetch(&github)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
