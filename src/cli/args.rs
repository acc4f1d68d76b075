//! Clap argument types and input validation.

use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

use shipnote::models::{LocalQuery, RemoteQuery};
use shipnote::output::ChangelogReport;
use shipnote::sources::DateWindow;

/// Turn commit history into a categorized changelog.
#[derive(Parser, Debug)]
#[command(
    name = "shipnote",
    version = shipnote::constants::VERSION,
    about = "Turn commit history into a categorized changelog.",
)]
pub struct Cli {
    /// Log pipeline diagnostics to stderr (overrides SHIPNOTE_LOG).
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Generate a changelog from commits.
    Generate(Box<GenerateArgs>),

    /// Print the commits a source would feed into generation, as JSON.
    Fetch(FetchArgs),

    /// Extract owner/repo from a GitHub URL.
    ParseUrl(ParseUrlArgs),

    /// List repositories of the authenticated GitHub user.
    Repos(ReposArgs),

    /// Manage the stored GitHub token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Print version and build information.
    Version,
}

/// Token management subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum TokenAction {
    /// Store a GitHub token (~/.config/shipnote/credentials.json).
    Set {
        /// The personal access token.
        token: String,
    },
    /// Show which token would be used and where it comes from.
    Status,
    /// Remove the stored token.
    Clear,
}

/// Arguments for the `parse-url` subcommand.
#[derive(Parser, Debug)]
pub struct ParseUrlArgs {
    /// Repository URL, e.g. https://github.com/owner/repo.git
    pub url: String,

    /// Print `{"owner": ..., "repo": ...}` instead of `owner/repo`.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for the `repos` subcommand.
#[derive(Parser, Debug)]
pub struct ReposArgs {
    /// GitHub token (default: SHIPNOTE_GITHUB_TOKEN, GITHUB_TOKEN, then the stored token).
    #[arg(long)]
    pub token: Option<String>,

    /// Number of repositories to list, most recently updated first.
    #[arg(long, default_value_t = 30)]
    pub limit: usize,
}

/// Repository-backed sources shared by `generate` and `fetch`.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    // --- Local repository ---
    /// Path to a local git work tree.
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Exclusive start of the range (tag, branch or commit).
    #[arg(long, requires = "repo")]
    pub from: Option<String>,

    /// End of the range (default: HEAD).
    #[arg(long, requires = "repo")]
    pub to: Option<String>,

    // --- GitHub repository ---
    /// GitHub repository URL.
    #[arg(long)]
    pub remote: Option<String>,

    /// GitHub token (default: SHIPNOTE_GITHUB_TOKEN, GITHUB_TOKEN, then the stored token).
    #[arg(long, requires = "remote")]
    pub token: Option<String>,

    /// Only commits after this ISO-8601 timestamp.
    #[arg(long, requires = "remote", conflicts_with = "last")]
    pub since: Option<String>,

    /// Only commits before this ISO-8601 timestamp.
    #[arg(long, requires = "remote", conflicts_with = "last")]
    pub until: Option<String>,

    /// Relative window: "last 2 weeks", "today", "yesterday", "all".
    #[arg(long, requires = "remote")]
    pub last: Option<String>,

    /// Fetch the whole history, up to the configured ceiling.
    #[arg(long, requires = "remote", conflicts_with_all = ["since", "last"], default_value_t = false)]
    pub all: bool,

    /// Maximum number of commits to read.
    #[arg(long)]
    pub limit: Option<usize>,
}

impl SourceArgs {
    fn count(&self) -> usize {
        [self.repo.is_some(), self.remote.is_some()]
            .iter()
            .filter(|&&x| x)
            .count()
    }

    /// Resolve the repository-backed input, if one was given.
    fn input_mode(&self) -> Result<Option<InputMode>, String> {
        if let Some(ref path) = self.repo {
            let mut query = LocalQuery::new(path.clone());
            query.from_ref = self.from.clone();
            if let Some(ref to) = self.to {
                query.to_ref = to.clone();
            }
            query.limit = self.limit;
            return Ok(Some(InputMode::Local(query)));
        }

        let Some(ref url) = self.remote else {
            return Ok(None);
        };

        let mut query = RemoteQuery {
            since: self.since.clone(),
            until: self.until.clone(),
            limit: self.limit,
        };
        let mut all_history = self.all;
        if let Some(ref last) = self.last {
            let window: DateWindow = last.parse().map_err(|e| format!("{e}"))?;
            let (since, until) = window.bounds().map_err(|e| format!("{e}"))?;
            query.since = since;
            query.until = until;
            all_history = window.is_all();
        }

        Ok(Some(InputMode::Remote {
            url: url.clone(),
            query,
            all_history,
        }))
    }
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    // --- Input (one required) ---
    /// Plain-text commit log, one commit message per line.
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Read a plain-text commit log from stdin.
    #[arg(long, default_value_t = false)]
    pub stdin: bool,

    /// JSON array of commit records (`hash`, `message`, `author`, `date`).
    #[arg(long)]
    pub commits_file: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    // --- Output ---
    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Write the rendered changelog to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Validate that exactly one input source was given and resolve it.
    pub fn validate_input(&self) -> Result<InputMode, String> {
        let count = [
            self.text_file.is_some(),
            self.stdin,
            self.commits_file.is_some(),
        ]
        .iter()
        .filter(|&&x| x)
        .count()
            + self.source.count();

        if count == 0 {
            return Err(
                "one input source is required: --text-file, --stdin, --commits-file, --repo, or --remote"
                    .to_string(),
            );
        }
        if count > 1 {
            return Err(
                "only one input source allowed: --text-file, --stdin, --commits-file, --repo, or --remote"
                    .to_string(),
            );
        }

        if let Some(ref path) = self.text_file {
            Ok(InputMode::TextFile(path.clone()))
        } else if self.stdin {
            Ok(InputMode::Stdin)
        } else if let Some(ref path) = self.commits_file {
            Ok(InputMode::CommitsFile(path.clone()))
        } else {
            self.source
                .input_mode()?
                .ok_or_else(|| "one input source is required".to_string())
        }
    }
}

/// Arguments for the `fetch` subcommand.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl FetchArgs {
    pub fn validate_input(&self) -> Result<InputMode, String> {
        match self.source.count() {
            0 => Err("one input source is required: --repo or --remote".to_string()),
            1 => self
                .source
                .input_mode()?
                .ok_or_else(|| "one input source is required".to_string()),
            _ => Err("only one input source allowed: --repo or --remote".to_string()),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Render a report using the renderer for this format.
    pub fn render(&self, report: &ChangelogReport) -> String {
        use shipnote::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => shipnote::output::terminal::TerminalRenderer.render(report),
            OutputFormat::Markdown => shipnote::output::markdown::MarkdownRenderer.render(report),
            OutputFormat::Json => shipnote::output::json::JsonRenderer.render(report),
        }
    }
}

// InputMode is defined in models/ and re-exported here for convenience.
pub use shipnote::models::InputMode;
