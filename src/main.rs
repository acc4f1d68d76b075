//! shipnote: turn commit history into a categorized changelog.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use shipnote::config;
use shipnote::constants;
use shipnote::credentials;
use shipnote::env;
use shipnote::output;
use shipnote::pipeline;
use shipnote::providers;
use shipnote::sources;

use std::io::Read;
use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, FetchArgs, GenerateArgs, InputMode, ParseUrlArgs, ReposArgs, TokenAction};
use config::Config;
use credentials::{CredentialStore, FileCredentialStore};
use env::Env;
use output::ChangelogReport;
use pipeline::ChangelogPipeline;
use providers::ChangelogProvider;
use providers::rig::RigProvider;
use sources::GithubClient;
use sources::url::parse_repository_url;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => run_generate(*args).await,
        Command::Fetch(args) => run_fetch(args).await,
        Command::ParseUrl(args) => run_parse_url(args),
        Command::Repos(args) => run_repos(args).await,
        Command::Token { action } => run_token(action),
        Command::Version => run_version(),
    }
}

/// Install the stderr log subscriber. `--verbose` wins over `SHIPNOTE_LOG`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shipnote=debug")
    } else {
        EnvFilter::try_from_env(constants::ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "commit:".dimmed(), constants::GIT_SHA);
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Load layered config rooted at `root` (repo-local `.shipnote.toml` lives there).
fn load_config(root: Option<&Path>, env: &Env) -> Result<Config> {
    let cwd;
    let root = match root {
        Some(root) => root,
        None => {
            cwd = std::env::current_dir().context("failed to determine current directory")?;
            cwd.as_path()
        }
    };
    Config::load(Some(root), env).context("failed to load configuration")
}

/// Local runs read `.shipnote.toml` from the repository, others from the current directory.
fn config_root(input_mode: &InputMode) -> Option<&Path> {
    match input_mode {
        InputMode::Local(query) => Some(query.path.as_path()),
        _ => None,
    }
}

fn build_pipeline(config: &Config) -> ChangelogPipeline {
    let provider: Arc<dyn ChangelogProvider> = Arc::new(RigProvider::new(
        config.provider.clone(),
        config.generation.clone(),
    ));
    ChangelogPipeline::from_config(provider, config)
}

/// Resolve the GitHub token from `--token`, the environment, then the store.
fn github_token(flag: Option<&str>, env: &Env) -> Result<Option<String>> {
    let store = FileCredentialStore::new();
    let resolved = credentials::resolve_github_token(flag, env, &store)
        .context("failed to read stored GitHub token")?;
    Ok(resolved.map(|(token, source)| {
        tracing::debug!(source = %source, "using GitHub token");
        token
    }))
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read from stdin")?;
    Ok(buf)
}

/// Generate a changelog and render it.
async fn run_generate(args: GenerateArgs) -> Result<()> {
    let input_mode = args.validate_input().map_err(|e| anyhow!("{e}"))?;
    let env = Env::real();

    let config = load_config(config_root(&input_mode), &env)?;
    let pipeline = build_pipeline(&config);

    let (result, source) = match input_mode {
        InputMode::TextFile(path) => {
            let text = read_file(&path).await?;
            (pipeline.generate_from_text(&text).await, path.display().to_string())
        }
        InputMode::Stdin => {
            let text = read_stdin()?;
            (pipeline.generate_from_text(&text).await, "stdin".to_string())
        }
        InputMode::CommitsFile(path) => {
            let json = read_file(&path).await?;
            (pipeline.generate_from_json(&json).await, path.display().to_string())
        }
        InputMode::Local(query) => {
            cli::status(&format!(
                "Reading {} in {}",
                query.range_label(),
                query.path.display()
            ));
            let source = format!("{} {}", query.path.display(), query.range_label());
            (pipeline.generate_from_local(&query).await, source)
        }
        InputMode::Remote {
            url,
            mut query,
            all_history,
        } => {
            if all_history && query.limit.is_none() {
                query.limit = Some(config.github.all_limit);
            }
            let token = github_token(args.source.token.as_deref(), &env)?;
            cli::status(&format!("Fetching commits from {url}"));
            (
                pipeline
                    .generate_from_remote_url(token.as_deref(), &url, &query)
                    .await,
                url,
            )
        }
    };

    let success = result.success;
    let report = ChangelogReport::new(result, source);

    if !success {
        if args.output.is_some() {
            bail!(
                "{}",
                report.result.error.as_deref().unwrap_or("changelog generation failed")
            );
        }
        print!("{}", args.format.render(&report));
        process::exit(1);
    }

    let rendered = args.format.render(&report);
    match args.output {
        Some(path) => write_output(&path, &rendered).await?,
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn write_output(path: &Path, rendered: &str) -> Result<()> {
    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    cli::status(&format!("Wrote changelog to {}", path.display()));
    Ok(())
}

/// Print the commits a source yields, as JSON.
async fn run_fetch(args: FetchArgs) -> Result<()> {
    let input_mode = args.validate_input().map_err(|e| anyhow!("{e}"))?;
    let env = Env::real();

    let config = load_config(config_root(&input_mode), &env)?;
    let pipeline = build_pipeline(&config);

    let records = match input_mode {
        InputMode::Local(query) => pipeline
            .fetch_local_commits(&query)
            .await
            .context("failed to read local history")?,
        InputMode::Remote {
            url,
            mut query,
            all_history,
        } => {
            if all_history && query.limit.is_none() {
                query.limit = Some(config.github.all_limit);
            }
            let repo = parse_repository_url(&url)?;
            let token = github_token(args.source.token.as_deref(), &env)?;
            pipeline
                .fetch_remote_commits(token.as_deref(), &repo, &query)
                .await
                .with_context(|| format!("failed to fetch commits for {repo}"))?
        }
        _ => bail!("fetch reads from --repo or --remote"),
    };

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn run_parse_url(args: ParseUrlArgs) -> Result<()> {
    let repo = parse_repository_url(&args.url)?;
    if args.json {
        let value = serde_json::json!({ "owner": repo.owner, "repo": repo.repo });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{repo}");
    }
    Ok(())
}

/// List the authenticated user's repositories.
async fn run_repos(args: ReposArgs) -> Result<()> {
    let env = Env::real();
    let config = load_config(None, &env)?;
    let Some(token) = github_token(args.token.as_deref(), &env)? else {
        bail!(
            "no GitHub token found: pass --token, set {} or {}, or run `shipnote token set <TOKEN>`",
            constants::ENV_GITHUB_TOKEN,
            constants::ENV_GITHUB_TOKEN_FALLBACK
        );
    };

    let repos = GithubClient::from_config(&config.github)
        .list_repositories(&token, args.limit)
        .await
        .context("failed to list repositories")?;

    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    for repo in &repos {
        let visibility = if repo.private { "private" } else { "public" };
        println!(
            "  {}  {}  {}",
            repo.full_name.bold(),
            visibility.dimmed(),
            format!("★ {}", repo.stargazers_count).yellow(),
        );
        if let Some(ref description) = repo.description {
            println!("         {}", description.dimmed());
        }
    }
    Ok(())
}

/// Manage the stored GitHub token.
fn run_token(action: TokenAction) -> Result<()> {
    let store = FileCredentialStore::new();

    match action {
        TokenAction::Set { token } => {
            let token = token.trim();
            if token.is_empty() {
                bail!("token must not be empty");
            }
            store
                .set(constants::GITHUB_TOKEN_KEY, token)
                .context("failed to store GitHub token")?;
            let location = store
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "  {} GitHub token stored in {}",
                "✔".green().bold(),
                location
            );
        }
        TokenAction::Status => {
            match credentials::resolve_github_token(None, &Env::real(), &store)
                .context("failed to read stored GitHub token")?
            {
                Some((token, source)) => {
                    println!("  {}  {}", "Token:".cyan(), credentials::mask(&token));
                    println!("  {}   {}", "From:".cyan(), source);
                }
                None => {
                    println!("  No GitHub token configured.");
                    println!("  Use `shipnote token set <TOKEN>` to add one.");
                }
            }
        }
        TokenAction::Clear => {
            let removed = store
                .remove(constants::GITHUB_TOKEN_KEY)
                .context("failed to remove GitHub token")?;
            if removed {
                println!("  {} GitHub token removed.", "✔".green().bold());
            } else {
                println!("  No stored GitHub token.");
            }
        }
    }

    Ok(())
}
