//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.shipnote.toml` in repo root
//! 4. `~/.config/shipnote/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    ENV_API_KEY, ENV_BASE_URL, ENV_GITHUB_API, ENV_MODEL, ENV_PROVIDER, GITHUB_API_BASE,
};
use crate::env::Env;
use crate::models::ProviderName;
use crate::render::DEFAULT_HEADING_MARKERS;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
    pub github: GithubConfig,
    pub render: RenderConfig,
}

/// Generation service configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Prompt sizing and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on the serialized commit list, in characters.
    pub max_prompt_chars: usize,
    pub max_tokens: u64,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 60_000,
            max_tokens: 4000,
            temperature: 0.3,
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    /// Result ceiling when no window or limit is given.
    pub default_limit: usize,
    /// Result ceiling for `--all`.
    pub all_limit: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            default_limit: 100,
            all_limit: 1000,
        }
    }
}

/// Response segmentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Line prefixes that start a new section.
    pub heading_markers: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heading_markers: DEFAULT_HEADING_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }

        // Generation settings
        let default_generation = GenerationConfig::default();
        if other.generation.max_prompt_chars != default_generation.max_prompt_chars {
            self.generation.max_prompt_chars = other.generation.max_prompt_chars;
        }
        if other.generation.max_tokens != default_generation.max_tokens {
            self.generation.max_tokens = other.generation.max_tokens;
        }
        if other.generation.temperature != default_generation.temperature {
            self.generation.temperature = other.generation.temperature;
        }

        // GitHub settings
        let default_github = GithubConfig::default();
        if other.github.api_base != default_github.api_base {
            self.github.api_base = other.github.api_base;
        }
        if other.github.default_limit != default_github.default_limit {
            self.github.default_limit = other.github.default_limit;
        }
        if other.github.all_limit != default_github.all_limit {
            self.github.all_limit = other.github.all_limit;
        }

        // Render settings
        if other.render != RenderConfig::default() {
            self.render = other.render;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(ENV_PROVIDER) {
            if let Ok(name) = val.parse::<ProviderName>() {
                self.provider.name = name;
            } else {
                tracing::warn!("ignoring invalid {ENV_PROVIDER} value: {val}");
            }
        }
        if let Some(val) = env.non_empty(ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.non_empty(ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env.first_non_empty(&[ENV_API_KEY, self.provider.name.api_key_env_var()]);
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Some(val) = env.non_empty(ENV_GITHUB_API) {
            self.github.api_base = val;
        }
    }
}
