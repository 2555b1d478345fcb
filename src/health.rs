use crate::api::AppState;
use crate::collection::MAX_REPOS;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub tracked_repos: usize,
    pub max_repos: usize,
    pub token_configured: bool,
    pub loading: bool,
}

/// Liveness probe response (minimal, just indicates the process is running)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Main health check endpoint
///
/// Without a token requests fall under the anonymous rate limit, which is
/// reported as degraded.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let token_configured = state.tokens.get_token().await.is_some();
    let tracked_repos = state.collection.read().await.len();

    Json(HealthResponse {
        status: if token_configured {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tracked_repos,
        max_repos: MAX_REPOS,
        token_configured,
        loading: state.loading.borrow().is_loading,
    })
}

pub async fn liveness_check() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}
