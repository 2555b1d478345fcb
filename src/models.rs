use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One star in a repository's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarPoint {
    pub timestamp: DateTime<Utc>,
    /// 1-based rank of this star in arrival order.
    pub sequence: usize,
}

/// A repository being charted, with the series it was loaded with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRepo {
    pub username: String,
    pub repo: String,
    pub color: String,
    pub series: Vec<StarPoint>,
}

impl TrackedRepo {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.username, self.repo)
    }

    pub fn is(&self, username: &str, repo: &str) -> bool {
        self.username == username && self.repo == repo
    }

    pub fn star_count(&self) -> usize {
        self.series.len()
    }
}

/// Where the access token is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// Lives as long as the token store, like a browser session.
    #[default]
    #[serde(alias = "session")]
    Ephemeral,
    /// Written to the credentials file and picked up again on the next start.
    #[serde(alias = "local")]
    Durable,
}

impl StorageScope {
    /// Lenient parse: unknown names select the ephemeral scope.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for StorageScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ephemeral" | "session" => Ok(StorageScope::Ephemeral),
            "durable" | "local" => Ok(StorageScope::Durable),
            other => Err(format!("unknown storage scope '{}'", other)),
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Ephemeral => write!(f, "ephemeral"),
            StorageScope::Durable => write!(f, "durable"),
        }
    }
}

/// A displayable title/message pair for a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Progress of the repository load currently running, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingState {
    pub is_loading: bool,
    pub progress: f64,
}
