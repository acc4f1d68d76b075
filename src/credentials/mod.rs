//! Credential persistence and resolution.
//!
//! The pipeline never reads credentials itself: callers resolve a token
//! (flag, environment, then store) and pass the string explicitly.

pub mod store;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use crate::constants::{ENV_GITHUB_TOKEN, ENV_GITHUB_TOKEN_FALLBACK, GITHUB_TOKEN_KEY};
use crate::env::Env;

pub use store::FileCredentialStore;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no config directory available for credential storage")]
    NoConfigDir,

    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Key-value storage for secrets.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    /// Returns `true` if a value was removed.
    fn remove(&self, key: &str) -> Result<bool, CredentialError>;
}

/// In-process store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CredentialError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.remove(key).is_some())
    }
}

/// Where a resolved GitHub token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Env(&'static str),
    Store,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Flag => write!(f, "--token flag"),
            TokenSource::Env(name) => write!(f, "{name} environment variable"),
            TokenSource::Store => write!(f, "credential store"),
        }
    }
}

/// Resolve the GitHub token: flag, then environment, then the store.
pub fn resolve_github_token(
    flag: Option<&str>,
    env: &Env,
    store: &dyn CredentialStore,
) -> Result<Option<(String, TokenSource)>, CredentialError> {
    if let Some(token) = flag.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some((token.to_string(), TokenSource::Flag)));
    }
    for name in [ENV_GITHUB_TOKEN, ENV_GITHUB_TOKEN_FALLBACK] {
        if let Some(token) = env.non_empty(name) {
            return Ok(Some((token, TokenSource::Env(name))));
        }
    }
    Ok(store
        .get(GITHUB_TOKEN_KEY)?
        .filter(|t| !t.trim().is_empty())
        .map(|t| (t, TokenSource::Store)))
}

/// Mask a secret for display, keeping a short prefix.
pub fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{prefix}****")
    }
}
