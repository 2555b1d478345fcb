//! Holds the single access token used for authenticated requests.
//!
//! The token lives in one of two scopes. The ephemeral scope is an in-memory
//! slot that disappears with the store. The durable scope is a small JSON
//! credentials file keyed by [`STORAGE_KEY`]. Storing a token in one scope
//! removes it from the other.

use crate::error::{Result, StarHistoryError};
use crate::github::StargazerApi;
use crate::models::StorageScope;
use crate::types::AuthenticatedUser;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const STORAGE_KEY: &str = "access_token";
const PREVIEW_LEN: usize = 6;

#[derive(Debug, Default)]
struct TokenState {
    scope: StorageScope,
    ephemeral: Option<String>,
    /// In-memory copy of the value in the credentials file.
    durable: Option<String>,
}

impl TokenState {
    fn active(&self) -> Option<&String> {
        match self.scope {
            StorageScope::Ephemeral => self.ephemeral.as_ref(),
            StorageScope::Durable => self.durable.as_ref(),
        }
    }
}

pub struct TokenStore {
    api: Arc<dyn StargazerApi>,
    durable_path: PathBuf,
    state: RwLock<TokenState>,
}

impl TokenStore {
    /// Create a store with nothing in either scope. The credentials file is
    /// neither read nor removed; it is only written when a durable token is
    /// stored through this store.
    pub fn new(api: Arc<dyn StargazerApi>, durable_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            durable_path: durable_path.into(),
            state: RwLock::new(TokenState::default()),
        }
    }

    /// Create a store and pick up a token left in the credentials file. When
    /// one is found the durable scope becomes active.
    pub async fn open(api: Arc<dyn StargazerApi>, durable_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(api, durable_path);
        let durable = read_entries(&store.durable_path)
            .await?
            .get(STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        {
            let mut state = store.state.write().await;
            if durable.is_some() {
                debug!(path = %store.durable_path.display(), "Loaded stored access token");
                state.scope = StorageScope::Durable;
            }
            state.durable = durable;
        }

        Ok(store)
    }

    /// Validate `token` with the API, then make it the only stored token,
    /// kept in `scope`.
    ///
    /// A rejected token leaves the previous token and scope as they were.
    pub async fn set_token(&self, token: &str, scope: StorageScope) -> Result<AuthenticatedUser> {
        let token = token.trim();
        if token.is_empty() {
            return Err(StarHistoryError::AuthError("access token is empty".to_string()));
        }

        let user = match self.api.validate_token(token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(preview = %preview(token), "Access token validation failed: {}", e);
                return Err(e);
            }
        };

        // storage is written before any in-memory state changes
        let mut state = self.state.write().await;
        match scope {
            StorageScope::Ephemeral => {
                if state.durable.is_some() {
                    remove_entry(&self.durable_path).await?;
                }
                state.durable = None;
                state.ephemeral = Some(token.to_string());
            }
            StorageScope::Durable => {
                write_entry(&self.durable_path, token).await?;
                state.ephemeral = None;
                state.durable = Some(token.to_string());
            }
        }
        state.scope = scope;

        info!(login = %user.login, %scope, preview = %preview(token), "Stored access token");
        Ok(user)
    }

    /// The active token, if any.
    pub async fn get_token(&self) -> Option<String> {
        self.state.read().await.active().cloned()
    }

    /// Remove the token from the active scope.
    pub async fn clear_token(&self) -> Result<()> {
        let mut state = self.state.write().await;
        match state.scope {
            StorageScope::Ephemeral => state.ephemeral = None,
            StorageScope::Durable => {
                remove_entry(&self.durable_path).await?;
                state.durable = None;
            }
        }
        info!(scope = %state.scope, "Cleared access token");
        Ok(())
    }

    pub async fn scope(&self) -> StorageScope {
        self.state.read().await.scope
    }

    /// First characters of the active token, for display. Empty when unset.
    pub async fn token_preview(&self) -> String {
        self.state
            .read()
            .await
            .active()
            .map(|t| preview(t))
            .unwrap_or_default()
    }
}

fn preview(token: &str) -> String {
    token.chars().take(PREVIEW_LEN).collect()
}

async fn read_entries(path: &Path) -> Result<Map<String, Value>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(map) => Ok(map),
            _ => Err(StarHistoryError::ConfigError(format!(
                "credentials file {} is not a JSON object",
                path.display()
            ))),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_entries(path: &Path, entries: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(entries)?).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(())
}

async fn write_entry(path: &Path, token: &str) -> Result<()> {
    let mut entries = read_entries(path).await?;
    entries.insert(STORAGE_KEY.to_string(), Value::String(token.to_string()));
    write_entries(path, &entries).await
}

async fn remove_entry(path: &Path) -> Result<()> {
    let mut entries = read_entries(path).await?;
    if entries.remove(STORAGE_KEY).is_none() {
        return Ok(());
    }

    if entries.is_empty() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    } else {
        write_entries(path, &entries).await
    }
}
