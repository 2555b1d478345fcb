use crate::models::Alert;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarHistoryError {
    #[error("Repo {owner}/{repo} Not found")]
    RepoNotFound { owner: String, repo: String },

    #[error("Couldn't fetch stargazers data, error code {status} returned{}", message_suffix(.message))]
    FetchFailed {
        status: u16,
        message: Option<String>,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Repo already exists")]
    DuplicateRepo { owner: String, repo: String },

    #[error("Maximum repos that can be shown at the same time is {max}")]
    CapacityExceeded { max: usize },

    #[error("Another repository is still loading")]
    LoadInProgress,

    #[error("Invalid repository name: {0}")]
    InvalidRepoName(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn message_suffix(message: &Option<String>) -> String {
    match message.as_deref() {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

impl StarHistoryError {
    /// Short heading shown above the error message.
    pub fn title(&self) -> &'static str {
        match self {
            StarHistoryError::DuplicateRepo { .. } => "Repo exists",
            StarHistoryError::CapacityExceeded { .. } => "Reached max number of repos allowed",
            StarHistoryError::AuthError(_) => "Invalid access token",
            StarHistoryError::LoadInProgress => "Load in progress",
            _ => "Error loading stargazers",
        }
    }

    pub fn alert(&self) -> Alert {
        Alert {
            title: self.title().to_string(),
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StarHistoryError>;
