//! Local repository adapter.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use super::SourceError;
use crate::constants::UNKNOWN_AUTHOR;
use crate::models::{CommitRecord, LocalQuery};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// `git log` format: full hash, author name, strict ISO author date, raw body.
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%B%x1e";

/// Read the commits of `query` from a local work tree, newest first.
pub async fn read(query: &LocalQuery) -> Result<Vec<CommitRecord>, SourceError> {
    ensure_work_tree(&query.path).await?;

    if let Some(ref from) = query.from_ref {
        verify_commit(&query.path, from).await?;
    }
    verify_commit(&query.path, &query.to_ref).await?;

    let range = match query.from_ref {
        Some(ref from) => format!("{from}..{}", query.to_ref),
        None => query.to_ref.clone(),
    };

    let mut args = vec!["log".to_string(), LOG_FORMAT.to_string()];
    if let Some(limit) = query.limit {
        args.push(format!("--max-count={limit}"));
    }
    args.push(range.clone());
    args.push("--".to_string());

    let stdout = run_git(&query.path, &args).await?;
    let records = parse_log(&stdout);
    tracing::debug!(
        path = %query.path.display(),
        range = %range,
        count = records.len(),
        "read local history"
    );
    Ok(records)
}

/// Fail with `RepositoryNotFound` unless `path` is inside a git work tree.
async fn ensure_work_tree(path: &Path) -> Result<(), SourceError> {
    if !path.is_dir() {
        return Err(SourceError::RepositoryNotFound(path.to_path_buf()));
    }

    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(path)
        .output()
        .await
        .map_err(|e| SourceError::Git(format!("failed to run git: {e}")))?;

    let inside = output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true";
    if !inside {
        return Err(SourceError::RepositoryNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Fail with `InvalidRange` unless `reference` names a commit.
async fn verify_commit(path: &Path, reference: &str) -> Result<(), SourceError> {
    // A leading dash would be read as an option.
    if reference.is_empty() || reference.starts_with('-') {
        return Err(SourceError::InvalidRange(reference.to_string()));
    }

    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("{reference}^{{commit}}"))
        .current_dir(path)
        .output()
        .await
        .map_err(|e| SourceError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(SourceError::InvalidRange(reference.to_string()));
    }
    Ok(())
}

async fn run_git(path: &Path, args: &[String]) -> Result<String, SourceError> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .await
        .map_err(|e| SourceError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::Git(format!(
            "git log failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `git log` output produced with [`LOG_FORMAT`].
fn parse_log(stdout: &str) -> Vec<CommitRecord> {
    stdout
        .split(RECORD_SEP)
        .filter_map(|raw| {
            let raw = raw.trim_start_matches(['\n', '\r']);
            if raw.is_empty() {
                return None;
            }
            let mut fields = raw.splitn(4, FIELD_SEP);
            let hash = fields.next()?.trim();
            let author = fields.next().unwrap_or("").trim();
            let date = fields.next().unwrap_or("").trim();
            let message = fields.next().unwrap_or("").trim();

            if hash.is_empty() || message.is_empty() {
                return None;
            }

            Some(CommitRecord {
                hash: Some(hash.chars().take(7).collect()),
                message: message.to_string(),
                author: if author.is_empty() {
                    UNKNOWN_AUTHOR.to_string()
                } else {
                    author.to_string()
                },
                date: (!date.is_empty()).then(|| date.to_string()),
                url: None,
            })
        })
        .collect()
}
