//! ChangelogProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core to decouple the
//! codebase from the specific LLM library.

pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ErrorKind;
use crate::prompt::ChangelogPrompt;

/// Errors from the generation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    #[error("generation service returned an empty response")]
    EmptyResponse,

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Failure class reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Auth(_) => ErrorKind::Auth,
            ProviderError::Unavailable(_) => ErrorKind::UpstreamUnavailable,
            ProviderError::EmptyResponse => ErrorKind::EmptyResponse,
            ProviderError::NotConfigured(_) => ErrorKind::Validation,
        }
    }
}

/// Single-shot text generation for a changelog prompt.
///
/// Implementations make exactly one call per invocation and never retry.
/// The returned text is non-blank.
#[async_trait]
pub trait ChangelogProvider: Send + Sync {
    async fn complete(&self, prompt: &ChangelogPrompt) -> Result<String, ProviderError>;
}

/// Reject blank completions; trim the rest.
pub fn non_blank(text: String) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}
