//! # Token Store
//!
//! Holds the bearer token issued by `POST /api/v1/auth/login` and replays it
//! on every request.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login ──► TokenStore::set ──┬──► memory (RwLock)                      │
//! │                              └──► token.json (when a path is set)      │
//! │                                                                         │
//! │  startup ──► TokenStore::load(path) ──► memory                         │
//! │  logout / 401 ──► TokenStore::clear ──► memory + file removed          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The token is opaque here. Expiry is the backend's business: a 401 clears
//! the store and the cashier logs in again.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ClientResult;

/// A token as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl StoredToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        StoredToken {
            access_token: access_token.into(),
            token_type: default_token_type(),
            saved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    token: RwLock<Option<StoredToken>>,
}

impl TokenStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        TokenStore::default()
    }

    /// Opens a file-backed store, reading any token saved earlier.
    ///
    /// A missing file is an empty store. A corrupt file is logged and
    /// ignored, since the only cure is logging in again anyway.
    pub fn load(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();

        let token = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredToken>(&contents) {
                Ok(token) => {
                    debug!(?path, saved_at = %token.saved_at, "Loaded saved token");
                    Some(token)
                }
                Err(e) => {
                    warn!(?path, error = %e, "Ignoring unreadable token file");
                    None
                }
            }
        } else {
            None
        };

        Ok(TokenStore {
            path: Some(path),
            token: RwLock::new(token),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self) -> Option<StoredToken> {
        self.token.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Replaces the token and writes it through to disk.
    pub async fn set(&self, token: StoredToken) -> ClientResult<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&token)?)?;
        }

        *self.token.write().await = Some(token);
        info!("Token stored");
        Ok(())
    }

    pub async fn clear(&self) -> ClientResult<()> {
        *self.token.write().await = None;

        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }

        info!("Token cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = TokenStore::in_memory();
        assert!(!store.is_logged_in().await);

        store.set(StoredToken::new("abc")).await.unwrap();
        assert_eq!(store.get().await.unwrap().access_token, "abc");

        store.clear().await.unwrap();
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_token_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("token.json");

        let store = TokenStore::load(&path).unwrap();
        assert!(store.get().await.is_none());
        store.set(StoredToken::new("eyJhbGciOi")).await.unwrap();

        let reopened = TokenStore::load(&path).unwrap();
        let token = reopened.get().await.unwrap();
        assert_eq!(token.access_token, "eyJhbGciOi");
        assert_eq!(token.token_type, "bearer");

        reopened.clear().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = TokenStore::load(&path).unwrap();
        assert!(!store.is_logged_in().await);
    }

    #[test]
    fn test_login_response_shape() {
        let token: StoredToken =
            serde_json::from_str(r#"{"access_token":"t0k","token_type":"bearer"}"#).unwrap();
        assert_eq!(token.access_token, "t0k");
    }
}
