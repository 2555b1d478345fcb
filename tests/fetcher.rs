mod common;

use common::{FakeGitHub, PageScript};
use star_history::error::StarHistoryError;
use star_history::fetcher::PaginatedFetcher;
use star_history::progress::{NoProgress, ProgressRecorder};
use std::sync::Arc;
use tokio::sync::mpsc;

fn fetcher(api: &Arc<FakeGitHub>) -> PaginatedFetcher {
    PaginatedFetcher::new(api.clone())
}

#[tokio::test]
async fn test_three_pages_are_numbered_in_arrival_order() {
    let api = Arc::new(FakeGitHub::new().with_repo("rust-lang", "rust", &[100, 100, 37]));
    let progress = ProgressRecorder::new();

    let series = fetcher(&api)
        .load_stargazers("rust-lang", "rust", None, &progress)
        .await
        .expect("load should succeed");

    assert_eq!(series.len(), 237);
    for (i, point) in series.iter().enumerate() {
        assert_eq!(point.sequence, i + 1);
    }
    assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    let pages: Vec<u32> = api.calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_progress_is_non_decreasing_and_ends_at_100() {
    let api = Arc::new(FakeGitHub::new().with_repo("a", "b", &[100, 100, 37]));
    let progress = ProgressRecorder::new();

    fetcher(&api)
        .load_stargazers("a", "b", None, &progress)
        .await
        .unwrap();

    let values = progress.values();
    assert_eq!(values.len(), 4);
    assert_eq!(values[0], 0.0);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!((values[1] - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(progress.last(), Some(100.0));
}

#[tokio::test]
async fn test_single_page_without_link_header() {
    let api = Arc::new(FakeGitHub::new().with_repo("a", "small", &[12]));
    let progress = ProgressRecorder::new();

    let series = fetcher(&api)
        .load_stargazers("a", "small", None, &progress)
        .await
        .unwrap();

    assert_eq!(series.len(), 12);
    assert_eq!(api.calls().len(), 1);
    assert_eq!(progress.values(), vec![0.0, 100.0]);
}

#[tokio::test]
async fn test_repository_without_stars() {
    let api = Arc::new(FakeGitHub::new().with_repo("a", "new", &[0]));

    let series = fetcher(&api)
        .load_stargazers("a", "new", None, &NoProgress)
        .await
        .unwrap();

    assert!(series.is_empty());
}

#[tokio::test]
async fn test_not_found_on_first_page() {
    let api = Arc::new(FakeGitHub::new().with_pages("ghost", "repo", vec![PageScript::NotFound]));
    let progress = ProgressRecorder::new();

    let result = fetcher(&api)
        .load_stargazers("ghost", "repo", None, &progress)
        .await;

    match result {
        Err(StarHistoryError::RepoNotFound { owner, repo }) => {
            assert_eq!(owner, "ghost");
            assert_eq!(repo, "repo");
        }
        other => panic!("Expected RepoNotFound, got: {:?}", other),
    }
    assert_eq!(progress.values(), vec![0.0]);
}

#[tokio::test]
async fn test_not_found_on_later_page() {
    let api = Arc::new(FakeGitHub::new().with_pages(
        "a",
        "gone",
        vec![
            PageScript::Stars {
                count: 100,
                link: common::link_header("a", "gone", 1, 2),
            },
            PageScript::NotFound,
        ],
    ));
    let progress = ProgressRecorder::new();

    let result = fetcher(&api)
        .load_stargazers("a", "gone", None, &progress)
        .await;

    assert!(matches!(result, Err(StarHistoryError::RepoNotFound { .. })));
    assert_eq!(progress.values(), vec![0.0, 50.0]);
    assert!(progress.values().iter().all(|p| *p < 100.0));
}

#[tokio::test]
async fn test_failure_mid_way_aborts_without_partial_series() {
    let api = Arc::new(FakeGitHub::new().with_pages(
        "a",
        "b",
        vec![
            PageScript::Stars {
                count: 100,
                link: common::link_header("a", "b", 1, 3),
            },
            PageScript::Status {
                status: 403,
                message: Some("API rate limit exceeded".to_string()),
            },
            PageScript::Stars {
                count: 10,
                link: None,
            },
        ],
    ));
    let progress = ProgressRecorder::new();

    let result = fetcher(&api)
        .load_stargazers("a", "b", None, &progress)
        .await;

    match result {
        Err(StarHistoryError::FetchFailed { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message.as_deref(), Some("API rate limit exceeded"));
        }
        other => panic!("Expected FetchFailed, got: {:?}", other),
    }

    // page 3 is never requested
    let pages: Vec<u32> = api.calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 2]);
    assert!(progress.values().iter().all(|p| *p < 100.0));
}

#[tokio::test]
async fn test_token_is_sent_with_every_page() {
    let api = Arc::new(FakeGitHub::new().with_repo("a", "b", &[100, 5]));

    fetcher(&api)
        .load_stargazers("a", "b", Some("ghp_secret"), &NoProgress)
        .await
        .unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.token.as_deref() == Some("ghp_secret")));
}

#[tokio::test]
async fn test_progress_over_channel() {
    let api = Arc::new(FakeGitHub::new().with_repo("a", "b", &[100, 100]));
    let (tx, mut rx) = mpsc::unbounded_channel();

    fetcher(&api)
        .load_stargazers("a", "b", None, &tx)
        .await
        .unwrap();
    drop(tx);

    let mut values = Vec::new();
    while let Some(v) = rx.recv().await {
        values.push(v);
    }
    assert_eq!(values, vec![0.0, 50.0, 100.0]);
}
