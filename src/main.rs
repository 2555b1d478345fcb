mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{parse_repo_name, Cli, Command, TokenAction};
use colored::*;
use star_history::api::{self, AppState};
use star_history::collection::RepoCollection;
use star_history::fetcher::PaginatedFetcher;
use star_history::github::{GitHubClient, StargazerApi};
use star_history::models::StorageScope;
use star_history::progress::ProgressSink;
use star_history::token_store::TokenStore;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Draws a one-line percentage on stderr.
struct ConsoleProgress {
    label: String,
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, percent: f64) {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{} {:>5.1}%", self.label.dimmed(), percent);
        let _ = stderr.flush();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api: Arc<dyn StargazerApi> = Arc::new(
        GitHubClient::with_base_url(cli.api_url.clone()).context("Failed to build GitHub client")?,
    );
    let token_path = cli.token_path()?;
    let fetcher = PaginatedFetcher::new(api.clone());

    match cli.command {
        Command::Fetch { repos, token, json } => {
            let token = match token {
                Some(token) => {
                    // run-only token: checked, used, never handed to the token store
                    api.validate_token(&token)
                        .await
                        .context("Access token was rejected")?;
                    Some(token)
                }
                None => open_tokens(api, &token_path).await?.get_token().await,
            };
            fetch(&fetcher, token, &repos, json).await?;
        }
        Command::Token { action } => {
            let tokens = open_tokens(api, &token_path).await?;
            token_command(&tokens, action).await?
        }
        Command::Serve { port, token } => {
            let tokens = match token {
                Some(token) => {
                    let tokens = TokenStore::new(api, &token_path);
                    tokens
                        .set_token(&token, StorageScope::Ephemeral)
                        .await
                        .context("Access token was rejected")?;
                    tokens
                }
                None => open_tokens(api, &token_path).await?,
            };
            println!("{}", "Star History API".bold().green());
            println!("{}\n", "=".repeat(50).dimmed());
            api::serve(AppState::new(fetcher, Arc::new(tokens)), port).await?;
        }
    }

    Ok(())
}

async fn open_tokens(api: Arc<dyn StargazerApi>, path: &Path) -> anyhow::Result<TokenStore> {
    TokenStore::open(api, path)
        .await
        .with_context(|| format!("Failed to read token file {}", path.display()))
}

async fn fetch(
    fetcher: &PaginatedFetcher,
    token: Option<String>,
    names: &[String],
    json: bool,
) -> anyhow::Result<()> {
    if token.is_none() {
        eprintln!(
            "{}",
            "⚠️ No access token set, requests use the anonymous rate limit".yellow()
        );
    }

    let mut collection = RepoCollection::new();
    let mut failures = 0;

    for name in names {
        let result = match parse_repo_name(name) {
            Ok((owner, repo)) => {
                let progress = ConsoleProgress {
                    label: format!("{}/{}", owner, repo),
                };
                let result = collection
                    .add(fetcher, &owner, &repo, token.as_deref(), &progress)
                    .await
                    .map(|_| ());
                eprintln!();
                result
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            failures += 1;
            let alert = e.alert();
            eprintln!("{} {}", format!("{}:", alert.title).red().bold(), alert.message);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(collection.repos())?);
    } else {
        for tracked in collection.repos() {
            let first = tracked.series.first().map(|p| p.timestamp.date_naive().to_string());
            println!(
                "{} {} {} stars{}",
                "●".truecolor_hex(&tracked.color),
                tracked.full_name().bold(),
                tracked.star_count(),
                first.map(|d| format!(", first on {}", d)).unwrap_or_default()
            );
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} repositories failed to load", failures, names.len());
    }
    Ok(())
}

async fn token_command(tokens: &TokenStore, action: TokenAction) -> anyhow::Result<()> {
    match action {
        TokenAction::Set { token, storage } => {
            let scope = StorageScope::from(storage);
            let user = tokens.set_token(&token, scope).await?;
            println!(
                "✅ Token for {} stored ({})",
                user.login.bold(),
                scope
            );
            if scope == StorageScope::Ephemeral {
                println!("{}", "Session tokens are forgotten when this command exits".dimmed());
            }
        }
        TokenAction::Show => {
            let preview = tokens.token_preview().await;
            if preview.is_empty() {
                println!("No access token set");
            } else {
                println!("{}… ({})", preview.bold(), tokens.scope().await);
            }
        }
        TokenAction::Clear => {
            tokens.clear_token().await?;
            println!("🗑️ Access token removed");
        }
    }
    Ok(())
}

trait HexColor {
    fn truecolor_hex(self, hex: &str) -> ColoredString;
}

impl HexColor for &str {
    fn truecolor_hex(self, hex: &str) -> ColoredString {
        let channel = |i: usize| {
            hex.trim_start_matches('#')
                .get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(255)
        };
        self.truecolor(channel(0), channel(2), channel(4))
    }
}
