use crate::error::{Result, StarHistoryError};
use crate::fetcher::PaginatedFetcher;
use crate::models::{StarPoint, TrackedRepo};
use crate::progress::ProgressSink;
use tracing::{info, warn};

pub const MAX_REPOS: usize = 8;

/// Series colors, handed out in order as repositories are added.
pub const PALETTE: [&str; MAX_REPOS] = [
    "#008FFB", "#00E396", "#FEB019", "#FF4560", "#775DD0", "#F86624", "#00B1F2", "#5A2A27",
];

/// The repositories currently charted, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct RepoCollection {
    repos: Vec<TrackedRepo>,
    /// Number of successful adds so far. Never decremented.
    added: usize,
}

impl RepoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repos(&self) -> &[TrackedRepo] {
        &self.repos
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn get(&self, username: &str, repo: &str) -> Option<&TrackedRepo> {
        self.repos.iter().find(|r| r.is(username, repo))
    }

    pub fn contains(&self, username: &str, repo: &str) -> bool {
        self.get(username, repo).is_some()
    }

    /// Color the next successfully added repository will get.
    pub fn next_color(&self) -> &'static str {
        PALETTE[self.added % PALETTE.len()]
    }

    /// Reject an add that would duplicate an entry or exceed [`MAX_REPOS`].
    pub fn ensure_can_add(&self, username: &str, repo: &str) -> Result<()> {
        if self.contains(username, repo) {
            return Err(StarHistoryError::DuplicateRepo {
                owner: username.to_string(),
                repo: repo.to_string(),
            });
        }

        if self.repos.len() + 1 > MAX_REPOS {
            return Err(StarHistoryError::CapacityExceeded { max: MAX_REPOS });
        }

        Ok(())
    }

    /// Store an already loaded series under the next palette color.
    pub fn insert(
        &mut self,
        username: &str,
        repo: &str,
        series: Vec<StarPoint>,
    ) -> Result<&TrackedRepo> {
        self.ensure_can_add(username, repo)?;

        let color = self.next_color().to_string();
        self.added += 1;
        self.repos.push(TrackedRepo {
            username: username.to_string(),
            repo: repo.to_string(),
            color,
            series,
        });

        let added = &self.repos[self.repos.len() - 1];
        info!(
            repo = %added.full_name(),
            color = %added.color,
            stars = added.star_count(),
            "Tracking repository"
        );
        Ok(added)
    }

    /// Load `username/repo` through `fetcher` and start tracking it.
    ///
    /// Duplicate and capacity checks happen before any request is made. On a
    /// failed load nothing is stored and no color is used up.
    pub async fn add(
        &mut self,
        fetcher: &PaginatedFetcher,
        username: &str,
        repo: &str,
        token: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<&TrackedRepo> {
        if let Err(e) = self.ensure_can_add(username, repo) {
            warn!("Rejected {}/{}: {}", username, repo, e);
            return Err(e);
        }

        let series = fetcher
            .load_stargazers(username, repo, token, progress)
            .await?;

        self.insert(username, repo, series)
    }

    /// Stop tracking `username/repo`. Returns the removed entry, if any.
    pub fn remove(&mut self, username: &str, repo: &str) -> Option<TrackedRepo> {
        let index = self.repos.iter().position(|r| r.is(username, repo))?;
        let removed = self.repos.remove(index);
        info!(repo = %removed.full_name(), "Stopped tracking repository");
        Some(removed)
    }
}
