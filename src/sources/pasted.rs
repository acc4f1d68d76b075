//! Pasted-text adapter: no I/O, just the free-text normalizer.

use crate::models::CommitRecord;
use crate::normalize::{self, ValidationError};

pub fn read(text: &str) -> Result<Vec<CommitRecord>, ValidationError> {
    let records = normalize::from_text(text)?;
    tracing::debug!(count = records.len(), "parsed pasted log");
    Ok(records)
}
