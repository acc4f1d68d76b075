//! Integration tests using a mock generation provider.
//!
//! Drives the changelog pipeline end-to-end (sources, prompt, rendering)
//! without real API calls by using a mock ChangelogProvider.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shipnote::models::{ChangelogRequest, CommitRecord, ErrorKind, LocalQuery, RemoteQuery, RepoRef};
use shipnote::pipeline::ChangelogPipeline;
use shipnote::prompt::{ChangelogPrompt, SYSTEM_PROMPT};
use shipnote::providers::{ChangelogProvider, ProviderError};
use shipnote::sources::GithubClient;

const CANNED: &str = "## Features:\n- Add dark mode - by alice\n\n## Fixes:\n- Fix login crash - by bob";

/// A mock provider that records prompts and returns a canned response.
struct MockProvider {
    response: Result<String, fn() -> ProviderError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<ChangelogPrompt>>,
}

impl MockProvider {
    fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: fn() -> ProviderError) -> Self {
        Self {
            response: Err(err),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> ChangelogPrompt {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChangelogProvider for MockProvider {
    async fn complete(&self, prompt: &ChangelogPrompt) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

fn pipeline(provider: &Arc<MockProvider>) -> ChangelogPipeline {
    pipeline_with_github(provider, GithubClient::new("http://127.0.0.1:9", 100))
}

fn pipeline_with_github(provider: &Arc<MockProvider>, github: GithubClient) -> ChangelogPipeline {
    let provider: Arc<dyn ChangelogProvider> = provider.clone();
    ChangelogPipeline::new(provider, github)
}

fn record(hash: &str, message: &str, author: &str) -> CommitRecord {
    CommitRecord {
        hash: Some(hash.to_string()),
        message: message.to_string(),
        author: author.to_string(),
        date: Some("2024-03-01T10:00:00Z".to_string()),
        url: None,
    }
}

// ---------------------------------------------------------------------------
// pasted text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn text_generates_sections() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let result = pipeline(&provider)
        .generate_from_text("feat: dark mode\nfix: login crash\n")
        .await;

    assert!(result.success, "got: {result:?}");
    assert_eq!(result.commit_count, Some(2));
    assert_eq!(result.notes.as_deref(), Some(CANNED));
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.sections[0].title(), Some("Features"));
    assert_eq!(result.sections[1].lines, vec!["- Fix login crash - by bob"]);
    assert!(result.warning.is_none());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn blank_text_never_calls_provider() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let result = pipeline(&provider).generate_from_text("  \n\n\t\n").await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(result.error.as_deref(), Some("no commits to process"));
    assert!(result.notes.is_none());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn prompt_lists_commits_with_unknown_author() {
    let provider = Arc::new(MockProvider::new(CANNED));
    pipeline(&provider)
        .generate_from_text("feat: dark mode\nfix: login crash")
        .await;

    let prompt = provider.last_prompt();
    assert_eq!(prompt.system, SYSTEM_PROMPT);
    assert!(prompt.user.contains("Commits from start to HEAD:"), "got: {}", prompt.user);
    assert!(prompt.user.contains("feat: dark mode (author: Unknown)"));
    assert!(prompt.user.contains("fix: login crash (author: Unknown)"));
}

// ---------------------------------------------------------------------------
// generation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_failure_is_reported_without_notes() {
    let provider = Arc::new(MockProvider::failing(|| ProviderError::Auth("invalid api key".into())));
    let result = pipeline(&provider).generate_from_text("feat: x").await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Auth));
    assert!(result.notes.is_none());
    assert!(result.sections.is_empty());
    assert_eq!(result.commit_count, Some(1));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn upstream_failure_is_not_retried() {
    let provider = Arc::new(MockProvider::failing(|| ProviderError::Unavailable("503".into())));
    let result = pipeline(&provider).generate_from_text("feat: x").await;

    assert_eq!(result.error_kind, Some(ErrorKind::UpstreamUnavailable));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn blank_response_is_empty_response() {
    let provider = Arc::new(MockProvider::new(" \n\n "));
    let result = pipeline(&provider).generate_from_text("feat: x").await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::EmptyResponse));
    assert!(result.notes.is_none());
}

// ---------------------------------------------------------------------------
// commit records and prompt bounds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commit_records_are_identical_across_runs() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let pipeline = pipeline(&provider);
    let commits = vec![
        record("a1b2c3d", "feat: add export\n\nLong body that is not sent.", "alice"),
        record("e4f5a6b", "fix: crash on empty input", "bob"),
    ];

    let first = pipeline
        .generate_from_commits(ChangelogRequest::new(commits.clone()))
        .await;
    let first_prompt = provider.last_prompt();
    let second = pipeline.generate_from_commits(ChangelogRequest::new(commits)).await;
    let second_prompt = provider.last_prompt();

    assert_eq!(first, second);
    assert_eq!(first_prompt, second_prompt);
    assert!(first_prompt.user.contains("a1b2c3d feat: add export (author: alice)"));
    assert!(!first_prompt.user.contains("Long body"));
}

#[tokio::test]
async fn oversized_input_is_truncated_with_warning() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let commits: Vec<CommitRecord> = (0..50)
        .map(|i| record(&format!("{i:07}"), &format!("feat: change number {i}"), "alice"))
        .collect();

    let result = pipeline(&provider)
        .with_max_prompt_chars(400)
        .generate_from_commits(ChangelogRequest::new(commits))
        .await;

    assert!(result.success);
    assert_eq!(result.commit_count, Some(50));
    assert!(result.omitted_commits > 0);
    let warning = result.warning.unwrap();
    assert!(warning.contains("of 50 commit(s) were omitted"), "got: {warning}");

    // Newest commits survive.
    let prompt = provider.last_prompt();
    assert!(prompt.user.contains("feat: change number 0 "));
    assert!(!prompt.user.contains("feat: change number 49 "));
    assert_eq!(prompt.included + prompt.omitted, 50);
}

#[tokio::test]
async fn malformed_commits_json_is_validation_failure() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let result = pipeline(&provider).generate_from_json("{not json").await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn commits_json_is_accepted() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let json = r#"[{"hash": "abc1234", "message": "feat: x", "author": "carol"}, {"message": "fix: y"}]"#;
    let result = pipeline(&provider).generate_from_json(json).await;

    assert!(result.success);
    assert_eq!(result.commit_count, Some(2));
    assert!(provider.last_prompt().user.contains("fix: y (author: Unknown)"));
}

// ---------------------------------------------------------------------------
// local repository
// ---------------------------------------------------------------------------

async fn git(dir: &Path, args: &[&str]) {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

async fn repo_with_tag() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    git(p, &["init"]).await;
    git(p, &["config", "user.email", "dev@example.com"]).await;
    git(p, &["config", "user.name", "Dev One"]).await;
    git(p, &["config", "commit.gpgsign", "false"]).await;
    git(p, &["commit", "--allow-empty", "-m", "chore: initial"]).await;
    git(p, &["tag", "v1.0.0"]).await;
    git(p, &["commit", "--allow-empty", "-m", "feat: add search"]).await;
    git(p, &["commit", "--allow-empty", "-m", "fix: handle empty query"]).await;
    dir
}

#[tokio::test]
async fn local_range_feeds_prompt() {
    let dir = repo_with_tag().await;
    let provider = Arc::new(MockProvider::new(CANNED));
    let mut query = LocalQuery::new(dir.path());
    query.from_ref = Some("v1.0.0".into());

    let result = pipeline(&provider).generate_from_local(&query).await;

    assert!(result.success, "got: {result:?}");
    assert_eq!(result.commit_count, Some(2));
    let prompt = provider.last_prompt();
    assert!(prompt.user.contains("Commits from v1.0.0 to HEAD:"));
    assert!(prompt.user.contains("feat: add search (author: Dev One)"));
    assert!(!prompt.user.contains("chore: initial"));
}

#[tokio::test]
async fn fetch_local_commits_skips_generation() {
    let dir = repo_with_tag().await;
    let provider = Arc::new(MockProvider::new(CANNED));

    let records = pipeline(&provider)
        .fetch_local_commits(&LocalQuery::new(dir.path()))
        .await
        .unwrap();

    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["fix: handle empty query", "feat: add search", "chore: initial"]);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn local_empty_range_is_reported() {
    let dir = repo_with_tag().await;
    let provider = Arc::new(MockProvider::new(CANNED));
    let mut query = LocalQuery::new(dir.path());
    query.from_ref = Some("HEAD".into());

    let result = pipeline(&provider).generate_from_local(&query).await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(result.error.as_deref(), Some("no commits found in the specified range"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn local_bad_ref_is_source_failure() {
    let dir = repo_with_tag().await;
    let provider = Arc::new(MockProvider::new(CANNED));
    let mut query = LocalQuery::new(dir.path());
    query.from_ref = Some("v9.9.9".into());

    let result = pipeline(&provider).generate_from_local(&query).await;

    assert_eq!(result.error_kind, Some(ErrorKind::Source));
    assert!(result.error.unwrap().contains("v9.9.9"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn non_repository_is_source_failure() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new(CANNED));
    let result = pipeline(&provider)
        .generate_from_local(&LocalQuery::new(dir.path()))
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::Source));
    assert_eq!(provider.calls(), 0);
}

// ---------------------------------------------------------------------------
// remote repository
// ---------------------------------------------------------------------------

fn api_commit(sha: &str, message: &str, login: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "html_url": format!("https://github.com/acme/widgets/commit/{sha}"),
        "commit": {
            "message": message,
            "author": {"name": "Someone", "date": "2024-03-01T10:00:00Z"},
            "committer": {"name": "GitHub", "date": "2024-03-01T10:00:00Z"}
        },
        "author": {"login": login}
    })
}

#[tokio::test]
async fn remote_history_feeds_prompt_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .and(header("Authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            api_commit("1111111aaaa", "feat: webhooks", "alice"),
            api_commit("2222222bbbb", "fix: retry header", "bob"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(MockProvider::new(CANNED));
    let pipeline = pipeline_with_github(&provider, GithubClient::new(server.uri(), 100));
    let query = RemoteQuery {
        since: Some("2024-02-01T00:00:00Z".into()),
        ..RemoteQuery::default()
    };

    let result = pipeline
        .generate_from_remote_url(Some("ghp_test"), "https://github.com/acme/widgets.git", &query)
        .await;

    assert!(result.success, "got: {result:?}");
    assert_eq!(result.commit_count, Some(2));
    let prompt = provider.last_prompt();
    assert!(prompt.user.contains("Commits from 2024-02-01T00:00:00Z to HEAD:"));
    assert!(prompt.user.contains("1111111 feat: webhooks (author: alice)"));
}

#[tokio::test]
async fn fetch_remote_commits_honors_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            api_commit("1111111aaaa", "feat: webhooks", "alice"),
            api_commit("2222222bbbb", "fix: retry header", "bob"),
            api_commit("3333333cccc", "docs: api guide", "carol"),
        ])))
        .mount(&server)
        .await;

    let provider = Arc::new(MockProvider::new(CANNED));
    let pipeline = pipeline_with_github(&provider, GithubClient::new(server.uri(), 100));
    let query = RemoteQuery {
        limit: Some(2),
        ..RemoteQuery::default()
    };
    let records = pipeline
        .fetch_remote_commits(None, &RepoRef::new("acme", "widgets"), &query)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hash.as_deref(), Some("1111111"));
    assert_eq!(records[1].author, "bob");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn remote_not_found_is_source_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/missing/commits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let provider = Arc::new(MockProvider::new(CANNED));
    let pipeline = pipeline_with_github(&provider, GithubClient::new(server.uri(), 100));
    let result = pipeline
        .generate_from_remote_url(None, "https://github.com/acme/missing", &RemoteQuery::default())
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::Source));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn remote_bad_credentials_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
        .mount(&server)
        .await;

    let provider = Arc::new(MockProvider::new(CANNED));
    let pipeline = pipeline_with_github(&provider, GithubClient::new(server.uri(), 100));
    let result = pipeline
        .generate_from_remote_url(Some("bad"), "https://github.com/acme/widgets", &RemoteQuery::default())
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::Auth));
}

#[tokio::test]
async fn invalid_url_fails_before_any_request() {
    let provider = Arc::new(MockProvider::new(CANNED));
    let result = pipeline(&provider)
        .generate_from_remote_url(None, "https://gitlab.com/acme/widgets", &RemoteQuery::default())
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Source));
    assert_eq!(provider.calls(), 0);
}
