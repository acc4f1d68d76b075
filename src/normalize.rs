//! Turns raw commit input into the canonical [`CommitRecord`] sequence.
//!
//! Two entry points: free text (one commit per line) and structured
//! records from a source adapter. Both preserve input order and reject
//! an empty result.

use thiserror::Error;

use crate::constants::UNKNOWN_AUTHOR;
use crate::models::CommitRecord;

/// Input that cannot produce a changelog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no commits to process")]
    NoCommits,

    #[error("no commits found in the specified range")]
    EmptyRange,

    #[error("invalid commit list: {0}")]
    Malformed(String),
}

/// Parse a pasted log: each non-blank line is one commit message.
pub fn from_text(text: &str) -> Result<Vec<CommitRecord>, ValidationError> {
    let records: Vec<CommitRecord> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(CommitRecord::from_message)
        .collect();

    if records.is_empty() {
        return Err(ValidationError::NoCommits);
    }
    Ok(records)
}

/// Clean structured records: drop blank messages, fill missing authors.
///
/// Hash, date and url pass through untouched.
pub fn from_records(records: Vec<CommitRecord>) -> Result<Vec<CommitRecord>, ValidationError> {
    let records: Vec<CommitRecord> = records
        .into_iter()
        .filter(|r| !r.message.trim().is_empty())
        .map(|mut r| {
            if r.author.trim().is_empty() {
                r.author = UNKNOWN_AUTHOR.to_string();
            }
            r
        })
        .collect();

    if records.is_empty() {
        return Err(ValidationError::NoCommits);
    }
    Ok(records)
}

/// Parse a JSON array of commit records (the `--commits-file` format).
pub fn from_json(json: &str) -> Result<Vec<CommitRecord>, ValidationError> {
    let records: Vec<CommitRecord> =
        serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    from_records(records)
}
