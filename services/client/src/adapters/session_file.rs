//! services/client/src/adapters/session_file.rs
//!
//! Durable session storage: a small JSON document holding the token, so a
//! session survives restarts. Implements the `SessionStore` port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shop_notify_core::domain::SessionToken;
use shop_notify_core::ports::{PortError, PortResult, SessionStore};
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// A `SessionStore` backed by a single JSON file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> PortResult<Option<SessionToken>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };

        let stored: StoredSession = serde_json::from_str(&raw).map_err(|e| {
            PortError::Storage(format!("Corrupt session file {}: {}", self.path.display(), e))
        })?;
        Ok(SessionToken::parse(stored.token))
    }

    async fn save(&self, token: &SessionToken) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?;
        }

        let json = serde_json::to_string(&StoredSession {
            token: token.as_str().to_string(),
        })
        .map_err(|e| PortError::Storage(e.to_string()))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileSessionStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn missing_file_is_no_session() {
        let (store, _dir) = test_store();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let (store, _dir) = test_store();
        let token = SessionToken::parse("abc").unwrap();

        store.save(&token).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn clear_wipes_and_is_repeatable() {
        let (store, _dir) = test_store();
        store.save(&SessionToken::parse("abc").unwrap()).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let (store, _dir) = test_store();
        tokio::fs::create_dir_all(store.path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&store.path, "{not json").await.unwrap();

        assert!(matches!(store.load().await, Err(PortError::Storage(_))));
    }
}
