use crate::collection::RepoCollection;
use crate::error::StarHistoryError;
use crate::fetcher::PaginatedFetcher;
use crate::health;
use crate::models::{LoadingState, StorageScope, TrackedRepo};
use crate::token_store::TokenStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state behind the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<RwLock<RepoCollection>>,
    pub tokens: Arc<TokenStore>,
    pub fetcher: PaginatedFetcher,
    /// Held for the duration of a load; only one repository loads at a time.
    pub load_gate: Arc<Mutex<()>>,
    pub loading: Arc<watch::Sender<LoadingState>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(fetcher: PaginatedFetcher, tokens: Arc<TokenStore>) -> Self {
        let (loading, _) = watch::channel(LoadingState::default());
        Self {
            collection: Arc::new(RwLock::new(RepoCollection::new())),
            tokens,
            fetcher,
            load_gate: Arc::new(Mutex::new(())),
            loading: Arc::new(loading),
            start_time: Instant::now(),
        }
    }
}

/// Request to start tracking a repository
#[derive(Debug, Serialize, Deserialize)]
pub struct AddRepoRequest {
    pub username: String,
    pub repo: String,
}

/// Request to store an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct SetTokenRequest {
    pub token: String,
    #[serde(default)]
    pub storage: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenStatus {
    pub configured: bool,
    pub scope: StorageScope,
    pub preview: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenAccepted {
    pub login: String,
    pub scope: StorageScope,
}

pub struct ApiError(pub StarHistoryError);

impl From<StarHistoryError> for ApiError {
    fn from(e: StarHistoryError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StarHistoryError::RepoNotFound { .. } => StatusCode::NOT_FOUND,
            StarHistoryError::DuplicateRepo { .. } | StarHistoryError::LoadInProgress => {
                StatusCode::CONFLICT
            }
            StarHistoryError::CapacityExceeded { .. } | StarHistoryError::InvalidRepoName(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            StarHistoryError::AuthError(_) => StatusCode::UNAUTHORIZED,
            StarHistoryError::FetchFailed { .. } | StarHistoryError::NetworkError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0.alert())).into_response()
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chart data and repository management
        .route("/repos", get(list_repos).post(add_repo))
        .route("/repos/:owner/:repo", get(get_repo).delete(remove_repo))
        .route("/loading", get(get_loading))

        // Access token
        .route("/token", get(get_token_status).put(set_token).delete(clear_token))

        .route("/health", get(health::health_check))
        .route("/healthz", get(health::health_check))
        .route("/livez", get(health::liveness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn serve(state: AppState, port: u16) -> crate::error::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Star history API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Every tracked repository with its series, ready for charting
async fn list_repos(State(state): State<AppState>) -> Json<Vec<TrackedRepo>> {
    Json(state.collection.read().await.repos().to_vec())
}

async fn get_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<TrackedRepo>, ApiError> {
    state
        .collection
        .read()
        .await
        .get(&owner, &repo)
        .cloned()
        .map(Json)
        .ok_or(ApiError(StarHistoryError::RepoNotFound { owner, repo }))
}

/// Load a repository's stargazers and start tracking it
async fn add_repo(
    State(state): State<AppState>,
    Json(request): Json<AddRepoRequest>,
) -> Result<(StatusCode, Json<TrackedRepo>), ApiError> {
    let username = request.username.trim();
    let repo = request.repo.trim();
    if username.is_empty() || repo.is_empty() {
        return Err(StarHistoryError::InvalidRepoName(format!("{}/{}", username, repo)).into());
    }

    state.collection.read().await.ensure_can_add(username, repo)?;

    let _gate = state
        .load_gate
        .try_lock()
        .map_err(|_| StarHistoryError::LoadInProgress)?;

    let token = state.tokens.get_token().await;
    let loaded = state
        .fetcher
        .load_stargazers(username, repo, token.as_deref(), state.loading.as_ref())
        .await;

    // the loading indicator is reset whatever the outcome
    state.loading.send_replace(LoadingState::default());

    let series = match loaded {
        Ok(series) => series,
        Err(e) => {
            warn!("Failed to load {}/{}: {}", username, repo, e);
            return Err(e.into());
        }
    };

    let mut collection = state.collection.write().await;
    let tracked = collection.insert(username, repo, series)?.clone();
    Ok((StatusCode::CREATED, Json(tracked)))
}

async fn remove_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> StatusCode {
    state.collection.write().await.remove(&owner, &repo);
    StatusCode::NO_CONTENT
}

async fn get_loading(State(state): State<AppState>) -> Json<LoadingState> {
    Json(*state.loading.borrow())
}

async fn get_token_status(State(state): State<AppState>) -> Json<TokenStatus> {
    let preview = state.tokens.token_preview().await;
    Json(TokenStatus {
        configured: !preview.is_empty(),
        scope: state.tokens.scope().await,
        preview,
    })
}

async fn set_token(
    State(state): State<AppState>,
    Json(request): Json<SetTokenRequest>,
) -> Result<Json<TokenAccepted>, ApiError> {
    let scope = request
        .storage
        .as_deref()
        .map(StorageScope::from_name)
        .unwrap_or_default();

    let user = state.tokens.set_token(&request.token, scope).await?;
    Ok(Json(TokenAccepted {
        login: user.login,
        scope,
    }))
}

async fn clear_token(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.tokens.clear_token().await?;
    Ok(StatusCode::NO_CONTENT)
}
