//! Stargazer history for GitHub repositories.
//!
//! Loads the full, timestamped stargazer list of a repository page by page,
//! keeps up to eight repositories side by side for charting, and manages the
//! access token used for authenticated requests.

pub mod api;
pub mod collection;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod health;
pub mod link_header;
pub mod models;
pub mod progress;
pub mod token_store;
pub mod types;

pub use collection::{RepoCollection, MAX_REPOS, PALETTE};
pub use error::{Result, StarHistoryError};
pub use fetcher::PaginatedFetcher;
pub use github::{GitHubClient, StargazerApi};
pub use models::{StarPoint, StorageScope, TrackedRepo};
pub use token_store::TokenStore;
