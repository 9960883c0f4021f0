//! services/client/src/live/session.rs
//!
//! The session state holder: the single source of truth for "is the user
//! authenticated". It is an explicit context object handed to every component
//! that needs the token; only the login and logout flows mutate it.

use shop_notify_core::domain::SessionToken;
use shop_notify_core::ports::SessionStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shared handle to the current session. Cloning is cheap; all clones see the same token.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    current: Arc<watch::Sender<Option<SessionToken>>>,
}

impl SessionContext {
    /// Reads the persisted token once. Corrupt or unreadable state is wiped and
    /// treated as "no session".
    pub async fn initialize(store: Arc<dyn SessionStore>) -> Self {
        let token = match store.load().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Discarding unreadable session state: {}", e);
                if let Err(e) = store.clear().await {
                    error!("Failed to wipe session state: {}", e);
                }
                None
            }
        };

        if token.is_some() {
            info!("Restored persisted session.");
        }

        let (current, _) = watch::channel(token);
        Self {
            store,
            current: Arc::new(current),
        }
    }

    /// The active token, if any.
    pub fn token(&self) -> Option<SessionToken> {
        self.current.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Notifies on every login and logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.current.subscribe()
    }

    /// Makes `token` the active session and persists it.
    pub async fn set_token(&self, token: SessionToken) {
        if let Err(e) = self.store.save(&token).await {
            error!("Failed to persist session token: {}", e);
        }
        self.current.send_replace(Some(token));
    }

    /// Drops the active session and wipes its durable state.
    pub async fn clear_session(&self) {
        self.current.send_replace(None);
        if let Err(e) = self.store.clear().await {
            error!("Failed to wipe session state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileSessionStore, MemorySessionStore};
    use tempfile::TempDir;

    fn token(raw: &str) -> SessionToken {
        SessionToken::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn initial_token_comes_from_storage() {
        let store = Arc::new(MemorySessionStore::with_token(token("abc")));
        let session = SessionContext::initialize(store).await;

        assert_eq!(session.token(), Some(token("abc")));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn empty_storage_means_no_session() {
        let session = SessionContext::initialize(Arc::new(MemorySessionStore::new())).await;
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn set_and_clear_are_persisted() {
        let store = Arc::new(MemorySessionStore::new());
        let session = SessionContext::initialize(store.clone()).await;

        session.set_token(token("abc")).await;
        assert_eq!(store.load().await.unwrap(), Some(token("abc")));

        session.clear_session().await;
        assert!(session.token().is_none());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_session() {
        let session = SessionContext::initialize(Arc::new(MemorySessionStore::new())).await;
        let view_copy = session.clone();
        let mut updates = view_copy.subscribe();

        session.set_token(token("abc")).await;

        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), Some(token("abc")));
        assert_eq!(view_copy.token(), Some(token("abc")));
    }

    #[tokio::test]
    async fn corrupt_storage_is_wiped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "garbage").await.unwrap();

        let session = SessionContext::initialize(Arc::new(FileSessionStore::new(&path))).await;

        assert!(session.token().is_none());
        assert!(!path.exists());
    }
}
