//! services/client/src/adapters/session_memory.rs
//!
//! A process-local `SessionStore`, for `--ephemeral` runs and tests.

use async_trait::async_trait;
use shop_notify_core::domain::SessionToken;
use shop_notify_core::ports::{PortResult, SessionStore};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a token already stored, as if persisted by an earlier run.
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> PortResult<Option<SessionToken>> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &SessionToken) -> PortResult<()> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}
