use chrono::{DateTime, Utc};
use serde::Deserialize;

// GitHub API response structures

/// An entry of the stargazer listing when requested with the star media type.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredEvent {
    pub starred_at: DateTime<Utc>,
    pub user: Option<GitHubUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// Response of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
    pub id: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub documentation_url: Option<String>,
}
