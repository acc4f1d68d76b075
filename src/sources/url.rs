//! GitHub repository URL decomposition.

use super::SourceError;
use crate::models::RepoRef;

/// Extract `{owner, repo}` from a GitHub URL.
///
/// Accepts HTTPS style (`https://github.com/owner/repo`, with or without
/// scheme, trailing path segments ignored) and SSH style
/// (`git@github.com:owner/repo.git`). A trailing `/` and `.git` are
/// stripped. Anything that does not point at github.com is `InvalidUrl`.
pub fn parse_repository_url(url: &str) -> Result<RepoRef, SourceError> {
    let invalid = || SourceError::InvalidUrl(url.to_string());

    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let rest = if let Some((_, rest)) = trimmed.split_once("github.com/") {
        rest
    } else if let Some((_, rest)) = trimmed.split_once("github.com:") {
        rest
    } else {
        return Err(invalid());
    };

    let mut parts = rest.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();
    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoRef::new(owner, repo))
}
