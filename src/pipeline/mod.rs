//! Changelog pipeline: source → normalize → prompt → generate → render.
//!
//! The `generate_*` operations never return `Err`: every failure is folded
//! into a [`ChangelogResult`] with `success: false` and an [`ErrorKind`].
//! Each invocation is independent and makes at most one generation call.

use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{ChangelogRequest, ChangelogResult, CommitRecord, LocalQuery, RemoteQuery, RepoRef};
use crate::normalize::{self, ValidationError};
use crate::prompt;
use crate::providers::{non_blank, ChangelogProvider, ProviderError};
use crate::render::{self, HeadingMarkers};
use crate::sources::url::parse_repository_url;
use crate::sources::{GithubClient, SourceConfig, SourceError};

pub use crate::models::ErrorKind;

/// Default bound on the serialized commit list.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 60_000;

/// Errors from one pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{source}")]
    Generation {
        source: ProviderError,
        commit_count: usize,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Source(e) => e.kind(),
            PipelineError::Generation { source, .. } => source.kind(),
        }
    }

    /// Number of commits collected before the failure, if any.
    pub fn commit_count(&self) -> Option<usize> {
        match self {
            PipelineError::Generation { commit_count, .. } => Some(*commit_count),
            _ => None,
        }
    }
}

impl From<PipelineError> for ChangelogResult {
    fn from(err: PipelineError) -> Self {
        ChangelogResult::failed(err.kind(), err.to_string(), err.commit_count())
    }
}

/// Runs changelog generations against one provider.
pub struct ChangelogPipeline {
    provider: Arc<dyn ChangelogProvider>,
    github: GithubClient,
    max_prompt_chars: usize,
    markers: HeadingMarkers,
}

impl ChangelogPipeline {
    pub fn new(provider: Arc<dyn ChangelogProvider>, github: GithubClient) -> Self {
        Self {
            provider,
            github,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            markers: HeadingMarkers::default(),
        }
    }

    /// Build a pipeline with limits and markers from `config`.
    pub fn from_config(provider: Arc<dyn ChangelogProvider>, config: &Config) -> Self {
        Self::new(provider, GithubClient::from_config(&config.github))
            .with_max_prompt_chars(config.generation.max_prompt_chars)
            .with_heading_markers(HeadingMarkers::new(config.render.heading_markers.iter().cloned()))
    }

    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    pub fn with_heading_markers(mut self, markers: HeadingMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Generate a changelog from a pasted log, one commit per line.
    pub async fn generate_from_text(&self, text: &str) -> ChangelogResult {
        self.generate(&SourceConfig::Pasted(text.to_string())).await
    }

    /// Generate a changelog from already-collected commits.
    pub async fn generate_from_commits(&self, request: ChangelogRequest) -> ChangelogResult {
        let span = tracing::info_span!(
            "changelog",
            run_id = %Uuid::new_v4(),
            source = "commit list"
        );
        async {
            let result = self.complete_request(request).await;
            finish(result)
        }
        .instrument(span)
        .await
    }

    /// Generate a changelog from a JSON array of commit records.
    pub async fn generate_from_json(&self, json: &str) -> ChangelogResult {
        match normalize::from_json(json) {
            Ok(records) => self.generate_from_commits(ChangelogRequest::new(records)).await,
            Err(e) => finish(Err(e.into())),
        }
    }

    /// Generate a changelog from a local work tree.
    pub async fn generate_from_local(&self, query: &LocalQuery) -> ChangelogResult {
        self.generate(&SourceConfig::Local(query.clone())).await
    }

    /// Generate a changelog from a GitHub repository URL.
    pub async fn generate_from_remote_url(
        &self,
        credential: Option<&str>,
        url: &str,
        query: &RemoteQuery,
    ) -> ChangelogResult {
        let repo = match parse_repository_url(url) {
            Ok(repo) => repo,
            Err(e) => return finish(Err(e.into())),
        };
        self.generate(&SourceConfig::Remote {
            credential: credential.map(String::from),
            repo,
            query: query.clone(),
        })
        .await
    }

    /// Generate a changelog from any source.
    pub async fn generate(&self, source: &SourceConfig) -> ChangelogResult {
        let span = tracing::info_span!(
            "changelog",
            run_id = %Uuid::new_v4(),
            source = %source.label()
        );
        async {
            let result = match self.collect(source).await {
                Ok(request) => self.complete_request(request).await,
                Err(e) => Err(e),
            };
            finish(result)
        }
        .instrument(span)
        .await
    }

    /// Read commits from a local work tree.
    pub async fn fetch_local_commits(
        &self,
        query: &LocalQuery,
    ) -> Result<Vec<CommitRecord>, SourceError> {
        crate::sources::local::read(query).await
    }

    /// Read commits from a GitHub repository.
    pub async fn fetch_remote_commits(
        &self,
        credential: Option<&str>,
        repo: &RepoRef,
        query: &RemoteQuery,
    ) -> Result<Vec<CommitRecord>, SourceError> {
        self.github.fetch_commits(credential, repo, query).await
    }

    /// Turn a source into a request with display labels.
    async fn collect(&self, source: &SourceConfig) -> Result<ChangelogRequest, PipelineError> {
        let records = source.fetch(&self.github).await?;

        let (from_ref, to_ref) = match source {
            SourceConfig::Pasted(_) => return Ok(ChangelogRequest::new(records)),
            SourceConfig::Local(query) => (query.from_ref.clone(), Some(query.to_ref.clone())),
            SourceConfig::Remote { query, .. } => (query.since.clone(), query.until.clone()),
        };

        if records.is_empty() {
            return Err(ValidationError::EmptyRange.into());
        }
        Ok(ChangelogRequest::new(records).with_range(from_ref, to_ref))
    }

    async fn complete_request(
        &self,
        request: ChangelogRequest,
    ) -> Result<ChangelogResult, PipelineError> {
        let commits = normalize::from_records(request.commits)?;
        let request = ChangelogRequest {
            commits,
            from_ref: request.from_ref,
            to_ref: request.to_ref,
        };
        let commit_count = request.commits.len();

        let prompt = prompt::build_prompt(&request, self.max_prompt_chars);
        tracing::debug!(
            commits = commit_count,
            included = prompt.included,
            prompt_chars = prompt.user.len(),
            "built prompt"
        );

        let notes = match self.provider.complete(&prompt).await.and_then(non_blank) {
            Ok(notes) => notes,
            Err(source) => {
                return Err(PipelineError::Generation {
                    source,
                    commit_count,
                });
            }
        };

        let sections = render::render_sections(&notes, &self.markers);
        Ok(ChangelogResult::generated(
            notes,
            sections,
            commit_count,
            prompt.omitted,
        ))
    }
}

fn finish(result: Result<ChangelogResult, PipelineError>) -> ChangelogResult {
    match result {
        Ok(result) => {
            tracing::info!(
                commits = result.commit_count.unwrap_or(0),
                omitted = result.omitted_commits,
                sections = result.sections.len(),
                "changelog generated"
            );
            result
        }
        Err(err) => {
            tracing::warn!(kind = %err.kind(), error = %err, "changelog generation failed");
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_kinds_and_counts() {
        let err = PipelineError::from(ValidationError::NoCommits);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.commit_count(), None);

        let err = PipelineError::from(SourceError::InvalidUrl("x".into()));
        assert_eq!(err.kind(), ErrorKind::Source);

        let err = PipelineError::Generation {
            source: ProviderError::EmptyResponse,
            commit_count: 4,
        };
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert_eq!(err.commit_count(), Some(4));
    }

    #[test]
    fn failure_result_carries_message_and_kind() {
        let result: ChangelogResult = PipelineError::from(ValidationError::EmptyRange).into();
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert_eq!(
            result.error.as_deref(),
            Some("no commits found in the specified range")
        );
    }
}
