//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "shipnote";

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple the binary was built for.
pub const TARGET: &str = env!("TARGET");

/// Short commit hash of the build, or `unknown`.
pub const GIT_SHA: &str = env!("SHIPNOTE_GIT_SHA");

/// User-Agent sent with every GitHub API request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("shipnote/", env!("CARGO_PKG_VERSION"));

/// Local config filename (e.g. `.shipnote.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".shipnote.toml";

/// Directory name under `~/.config/` for global config and credentials.
pub const CONFIG_DIR: &str = "shipnote";

/// File under [`CONFIG_DIR`] holding persisted credentials.
pub const CREDENTIALS_FILENAME: &str = "credentials.json";

/// Credential store key for the GitHub access token.
pub const GITHUB_TOKEN_KEY: &str = "github";

/// Default GitHub REST API base.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Author placeholder when a source cannot supply one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Footer shown under rendered changelogs.
pub const AI_DISCLOSURE: &str = "Generated by an AI model from commit messages; review before publishing.";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "SHIPNOTE_PROVIDER";
pub const ENV_MODEL: &str = "SHIPNOTE_MODEL";
pub const ENV_API_KEY: &str = "SHIPNOTE_API_KEY";
pub const ENV_BASE_URL: &str = "SHIPNOTE_BASE_URL";
pub const ENV_GITHUB_API: &str = "SHIPNOTE_GITHUB_API";
pub const ENV_GITHUB_TOKEN: &str = "SHIPNOTE_GITHUB_TOKEN";
pub const ENV_GITHUB_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";
pub const ENV_LOG: &str = "SHIPNOTE_LOG";
