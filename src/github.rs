use crate::error::{Result, StarHistoryError};
use crate::types::{ApiErrorBody, AuthenticatedUser, StarredEvent};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;
/// Media type that makes the stargazer listing include `starred_at`.
pub const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";

/// One page of the stargazer listing.
#[derive(Debug, Clone, Default)]
pub struct StargazerPage {
    pub events: Vec<StarredEvent>,
    /// Raw value of the `Link` response header.
    pub link: Option<String>,
}

/// The two GitHub calls the stargazer history needs.
#[async_trait]
pub trait StargazerApi: Send + Sync {
    /// `GET /repos/{owner}/{repo}/stargazers?per_page=100&page={page}`
    async fn fetch_stargazers_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        token: Option<&str>,
    ) -> Result<StargazerPage>;

    /// `GET /user`, used only to confirm a token is accepted.
    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser>;
}

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("star-history/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.get(url).header(header::ACCEPT, STAR_MEDIA_TYPE);
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => request.header(header::AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }
}

/// Pull the `message` field out of an error response, if there is one.
async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl StargazerApi for GitHubClient {
    async fn fetch_stargazers_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        token: Option<&str>,
    ) -> Result<StargazerPage> {
        let url = format!(
            "{}/repos/{}/{}/stargazers?per_page={}&page={}",
            self.base_url, owner, repo, PER_PAGE, page
        );
        debug!(%url, "Requesting stargazers page");

        let response = self.get(&url, token).send().await?;

        match response.status() {
            status if status.is_success() => {
                let link = response
                    .headers()
                    .get(header::LINK)
                    .and_then(|h| h.to_str().ok())
                    .map(String::from);
                let events: Vec<StarredEvent> = response.json().await?;
                Ok(StargazerPage { events, link })
            }
            StatusCode::NOT_FOUND => Err(StarHistoryError::RepoNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            status => {
                let message = error_message(response).await;
                warn!(%status, ?message, "Stargazers request failed");
                Err(StarHistoryError::FetchFailed {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let url = format!("{}/user", self.base_url);
        let response = self.get(&url, Some(token)).send().await?;

        let status = response.status();
        if status.is_success() {
            let user: AuthenticatedUser = response.json().await?;
            return Ok(user);
        }

        let message = error_message(response).await;
        Err(StarHistoryError::AuthError(match message {
            Some(message) => format!("token rejected with status {}: {}", status.as_u16(), message),
            None => format!("token rejected with status {}", status.as_u16()),
        }))
    }
}
