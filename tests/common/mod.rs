#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use star_history::error::{Result, StarHistoryError};
use star_history::github::{StargazerApi, StargazerPage};
use star_history::types::{AuthenticatedUser, StarredEvent};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// What the fake returns for one page request.
#[derive(Debug, Clone)]
pub enum PageScript {
    Stars { count: usize, link: Option<String> },
    NotFound,
    Status { status: u16, message: Option<String> },
}

/// A recorded page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCall {
    pub owner: String,
    pub repo: String,
    pub page: u32,
    pub token: Option<String>,
}

/// Scripted stand-in for the GitHub API.
#[derive(Default)]
pub struct FakeGitHub {
    pages: Mutex<HashMap<(String, String), Vec<PageScript>>>,
    valid_tokens: Mutex<HashSet<String>>,
    calls: Mutex<Vec<PageCall>>,
    validations: Mutex<Vec<String>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a repository whose pages hold `counts[i]` stars each, with a
    /// Link header advertising the last page on page 1.
    pub fn with_repo(self, owner: &str, repo: &str, counts: &[usize]) -> Self {
        let total = counts.len();
        let scripts = counts
            .iter()
            .enumerate()
            .map(|(i, count)| PageScript::Stars {
                count: *count,
                link: link_header(owner, repo, i as u32 + 1, total as u32),
            })
            .collect();
        self.with_pages(owner, repo, scripts)
    }

    pub fn with_pages(self, owner: &str, repo: &str, scripts: Vec<PageScript>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((owner.to_string(), repo.to_string()), scripts);
        self
    }

    pub fn with_valid_token(self, token: &str) -> Self {
        self.valid_tokens.lock().unwrap().insert(token.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn validations(&self) -> Vec<String> {
        self.validations.lock().unwrap().clone()
    }
}

/// Link header as GitHub sends it for `page` of `total`.
pub fn link_header(owner: &str, repo: &str, page: u32, total: u32) -> Option<String> {
    if total <= 1 {
        return None;
    }
    let url = |p: u32| {
        format!(
            "https://api.github.com/repos/{}/{}/stargazers?per_page=100&page={}",
            owner, repo, p
        )
    };
    let mut links = Vec::new();
    if page > 1 {
        links.push(format!("<{}>; rel=\"prev\"", url(page - 1)));
    }
    if page < total {
        links.push(format!("<{}>; rel=\"next\"", url(page + 1)));
        links.push(format!("<{}>; rel=\"last\"", url(total)));
    }
    links.push(format!("<{}>; rel=\"first\"", url(1)));
    Some(links.join(", "))
}

/// `count` stars, one minute apart, starting after `offset` earlier stars.
pub fn star_events(offset: usize, count: usize) -> Vec<StarredEvent> {
    (0..count)
        .map(|i| StarredEvent {
            starred_at: Utc
                .timestamp_opt(1_500_000_000 + ((offset + i) as i64) * 60, 0)
                .unwrap(),
            user: None,
        })
        .collect()
}

#[async_trait]
impl StargazerApi for FakeGitHub {
    async fn fetch_stargazers_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        token: Option<&str>,
    ) -> Result<StargazerPage> {
        self.calls.lock().unwrap().push(PageCall {
            owner: owner.to_string(),
            repo: repo.to_string(),
            page,
            token: token.map(String::from),
        });

        let scripts = self
            .pages
            .lock()
            .unwrap()
            .get(&(owner.to_string(), repo.to_string()))
            .cloned();
        let Some(scripts) = scripts else {
            return Err(StarHistoryError::RepoNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        };

        let offset: usize = scripts
            .iter()
            .take(page as usize - 1)
            .map(|s| match s {
                PageScript::Stars { count, .. } => *count,
                _ => 0,
            })
            .sum();

        match scripts.get(page as usize - 1) {
            Some(PageScript::Stars { count, link }) => Ok(StargazerPage {
                events: star_events(offset, *count),
                link: link.clone(),
            }),
            Some(PageScript::NotFound) => Err(StarHistoryError::RepoNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Some(PageScript::Status { status, message }) => Err(StarHistoryError::FetchFailed {
                status: *status,
                message: message.clone(),
            }),
            // past the end GitHub answers with an empty page
            None => Ok(StargazerPage::default()),
        }
    }

    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        self.validations.lock().unwrap().push(token.to_string());
        if self.valid_tokens.lock().unwrap().contains(token) {
            Ok(AuthenticatedUser {
                login: "octocat".to_string(),
                id: 583231,
            })
        } else {
            Err(StarHistoryError::AuthError(
                "token rejected with status 401: Bad credentials".to_string(),
            ))
        }
    }
}
