//! GitHub REST API client for commit history and repository listings.
//!
//! The credential is passed on every call; the client itself holds no
//! token. Errors are surfaced once and never retried.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::SourceError;
use crate::config::GithubConfig;
use crate::constants::{UNKNOWN_AUTHOR, USER_AGENT};
use crate::models::{CommitRecord, RemoteQuery, RepoRef, Repository};

/// Maximum page size the commits endpoint accepts.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
    commit: ApiCommitDetail,
    #[serde(default)]
    author: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: Option<ApiSignature>,
    #[serde(default)]
    committer: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    #[serde(default)]
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl ApiCommit {
    /// Login, then commit author name, then committer name.
    fn author_name(&self) -> String {
        fn non_blank(value: Option<&String>) -> Option<&str> {
            value.map(|v| v.trim()).filter(|v| !v.is_empty())
        }

        non_blank(self.author.as_ref().and_then(|u| u.login.as_ref()))
            .or_else(|| non_blank(self.commit.author.as_ref().and_then(|a| a.name.as_ref())))
            .or_else(|| non_blank(self.commit.committer.as_ref().and_then(|c| c.name.as_ref())))
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string()
    }

    fn into_record(self) -> CommitRecord {
        let author = self.author_name();
        CommitRecord {
            hash: Some(self.sha.chars().take(7).collect()),
            message: self.commit.message.trim().to_string(),
            author,
            date: self.commit.author.and_then(|a| a.date),
            url: self.html_url,
        }
    }
}

/// Thin client over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    api_base: String,
    default_limit: usize,
}

impl GithubClient {
    pub fn new(api_base: impl Into<String>, default_limit: usize) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            default_limit,
        }
    }

    pub fn from_config(config: &GithubConfig) -> Self {
        Self::new(config.api_base.clone(), config.default_limit)
    }

    fn get(&self, path: &str, credential: Option<&str>) -> RequestBuilder {
        let mut request = self
            .http
            .get(format!("{}{path}", self.api_base))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Fetch up to `query.limit` (or the default ceiling) commits, newest first.
    ///
    /// Pages through `/repos/{owner}/{repo}/commits` until the ceiling is
    /// reached or a short page comes back.
    pub async fn fetch_commits(
        &self,
        credential: Option<&str>,
        repo: &RepoRef,
        query: &RemoteQuery,
    ) -> Result<Vec<CommitRecord>, SourceError> {
        let ceiling = query.limit.unwrap_or(self.default_limit);
        let path = format!("/repos/{}/{}/commits", repo.owner, repo.repo);
        let mut records = Vec::new();
        let mut page = 1usize;

        while records.len() < ceiling {
            let mut params: Vec<(&str, String)> = vec![
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            if let Some(ref since) = query.since {
                params.push(("since", since.clone()));
            }
            if let Some(ref until) = query.until {
                params.push(("until", until.clone()));
            }

            let response = self
                .get(&path, credential)
                .query(&params)
                .send()
                .await
                .map_err(|e| SourceError::Unavailable(e.to_string()))?;

            // An empty repository has no history to list.
            if response.status() == StatusCode::CONFLICT {
                tracing::debug!(repo = %repo, "repository is empty");
                break;
            }
            let response = check_status(response, &repo.to_string()).await?;

            let batch: Vec<ApiCommit> = response
                .json()
                .await
                .map_err(|e| SourceError::Unavailable(format!("invalid commits response: {e}")))?;
            let short_page = batch.len() < PAGE_SIZE;

            let remaining = ceiling - records.len();
            records.extend(batch.into_iter().take(remaining).map(ApiCommit::into_record));

            if short_page {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            repo = %repo,
            since = query.since.as_deref().unwrap_or("-"),
            until = query.until.as_deref().unwrap_or("-"),
            ceiling,
            count = records.len(),
            "fetched remote history"
        );
        Ok(records)
    }

    /// Repositories of the authenticated user, most recently updated first.
    pub async fn list_repositories(
        &self,
        credential: &str,
        per_page: usize,
    ) -> Result<Vec<Repository>, SourceError> {
        let response = self
            .get("/user/repos", Some(credential))
            .query(&[("per_page", per_page.to_string()), ("sort", "updated".to_string())])
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let response = check_status(response, "/user/repos").await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::Unavailable(format!("invalid repositories response: {e}")))
    }
}

/// Map non-success statuses onto [`SourceError`].
async fn check_status(response: Response, subject: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let quota_exhausted = response
        .headers()
        .get("X-RateLimit-Remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| status.to_string());

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(detail),
        StatusCode::FORBIDDEN if quota_exhausted => SourceError::RateLimited(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Auth(detail),
        StatusCode::NOT_FOUND => SourceError::NotFound(subject.to_string()),
        _ => SourceError::Unavailable(format!("{status}: {detail}")),
    })
}
