use clap::{Parser, Subcommand, ValueEnum};
use star_history::error::{Result, StarHistoryError};
use star_history::github::API_BASE_URL;
use star_history::models::StorageScope;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "star-history")]
#[command(about = "Star History - Charts how GitHub repositories accumulated stargazers over time")]
#[command(version)]
pub struct Cli {
    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = API_BASE_URL, global = true)]
    pub api_url: String,

    /// File holding the durably stored access token
    #[arg(long, env = "STAR_HISTORY_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the stargazer history of one or more repositories
    Fetch {
        /// Repositories as owner/repo
        #[arg(required = true)]
        repos: Vec<String>,

        /// Access token for this run only (validated, never written to disk)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Print the chart series as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Access token for this server session only
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Validate a token and store it
    Set {
        token: String,

        #[arg(long, value_enum, default_value_t = StorageArg::Local)]
        storage: StorageArg,
    },
    /// Show which token is active
    Show,
    /// Remove the active token
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StorageArg {
    /// Kept only for the running process
    Session,
    /// Written to the token file
    Local,
}

impl From<StorageArg> for StorageScope {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Session => StorageScope::Ephemeral,
            StorageArg::Local => StorageScope::Durable,
        }
    }
}

impl Cli {
    pub fn token_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.token_file {
            return Ok(path.clone());
        }
        let base = dirs::config_dir().ok_or_else(|| {
            StarHistoryError::ConfigError("could not determine config directory".to_string())
        })?;
        Ok(base.join("star-history").join("credentials.json"))
    }
}

/// Split `owner/repo` into its two parts.
pub fn parse_repo_name(name: &str) -> Result<(String, String)> {
    let name = name.trim().trim_end_matches('/');
    let name = name
        .strip_prefix("https://github.com/")
        .unwrap_or(name)
        .trim_end_matches(".git");

    match name.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(StarHistoryError::InvalidRepoName(format!(
            "expected owner/repo, got '{}'",
            name
        ))),
    }
}
