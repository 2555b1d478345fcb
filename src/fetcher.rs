use crate::error::Result;
use crate::github::StargazerApi;
use crate::link_header::parse_last_page;
use crate::models::StarPoint;
use crate::progress::ProgressSink;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads the complete star history of one repository, page by page.
#[derive(Clone)]
pub struct PaginatedFetcher {
    api: Arc<dyn StargazerApi>,
}

impl PaginatedFetcher {
    pub fn new(api: Arc<dyn StargazerApi>) -> Self {
        Self { api }
    }

    /// Fetch every stargazer page of `owner/repo` and number the stars in
    /// arrival order.
    ///
    /// Pages are requested one after another; the page count comes from the
    /// `Link` header of page 1. Any failed page aborts the whole load and no
    /// partial series is returned. Progress starts at 0 and reaches 100 only
    /// once the last page has been received.
    pub async fn load_stargazers(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<StarPoint>> {
        progress.report(0.0);

        let mut series: Vec<StarPoint> = Vec::new();
        let mut total_pages = 1u32;
        let mut page = 1u32;

        while page <= total_pages {
            let result = self
                .api
                .fetch_stargazers_page(owner, repo, page, token)
                .await?;

            if page == 1 {
                total_pages = parse_last_page(result.link.as_deref());
                debug!(owner, repo, total_pages, "Resolved page count");
            }

            let fetched = result.events.len();
            for event in result.events {
                let sequence = series.len() + 1;
                series.push(StarPoint {
                    timestamp: event.starred_at,
                    sequence,
                });
            }

            debug!(owner, repo, page, fetched, "Fetched stargazers page");
            progress.report(f64::from(page) / f64::from(total_pages) * 100.0);
            page += 1;
        }

        info!(
            "Loaded {} stargazers from {} pages for {}/{}",
            series.len(),
            total_pages,
            owner,
            repo
        );

        Ok(series)
    }
}
