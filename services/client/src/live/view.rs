//! services/client/src/live/view.rs
//!
//! The mounted-view lifecycle. One `LiveView` stands for one screen instance:
//! mounting seeds the post list from history and opens the notification
//! connection; unmounting closes the connection. Feed and posts are published
//! through separate channels, so a history response and live messages can
//! interleave in any order.

use crate::live::{
    connector::{ConnectorHandle, FeedConnector},
    history::{HistoryLoader, HistoryOutcome},
    state::ClientState,
};
use shop_notify_core::domain::{ConnectionStatus, Feed, Post};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

/// What a screen needs from the live layer.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    /// Seed the post list from the history endpoint on mount.
    pub load_history: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { load_history: true }
    }
}

pub struct LiveView {
    id: Uuid,
    cancel: CancellationToken,
    connector: ConnectorHandle,
    posts: watch::Receiver<Vec<Post>>,
    history: Option<JoinHandle<HistoryOutcome>>,
    mounted: bool,
}

impl LiveView {
    /// Activates the view: starts the connector and, if requested and a session
    /// exists, the history fetch. Must be called inside a tokio runtime.
    pub fn mount(state: &ClientState, options: ViewOptions) -> Self {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        info!("Mounting live view {}", id);

        let connector = FeedConnector::new(
            state.transport.clone(),
            state.session.clone(),
            state.config.feed_url.clone(),
        )
        .activate(cancel.child_token());

        let (posts_tx, posts) = watch::channel(Vec::new());
        let history = match (options.load_history, state.session.token()) {
            (true, Some(token)) => {
                let loader = HistoryLoader::new(state.api.clone());
                let cancel = cancel.clone();
                Some(tokio::spawn(async move {
                    loader.refresh(&token, &posts_tx, &cancel).await
                }))
            }
            (true, None) => {
                info!("No active session; skipping history for view {}", id);
                None
            }
            (false, _) => None,
        };

        Self {
            id,
            cancel,
            connector,
            posts,
            history,
            mounted: true,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connector.status()
    }

    pub fn status_updates(&self) -> watch::Receiver<ConnectionStatus> {
        self.connector.status_updates()
    }

    pub fn feed(&self) -> watch::Receiver<Feed> {
        self.connector.feed()
    }

    pub fn posts(&self) -> watch::Receiver<Vec<Post>> {
        self.posts.clone()
    }

    /// Waits for the history fetch started at mount. `None` if none was started
    /// or its outcome was already taken.
    pub async fn history_settled(&mut self) -> Option<HistoryOutcome> {
        let task = self.history.take()?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("History task for view {} failed: {:?}", self.id, e);
                Some(HistoryOutcome::Failed)
            }
        }
    }

    /// Deactivates the view and closes its connection. An in-flight history fetch
    /// is left to finish and its result is dropped. Safe to call more than once.
    pub async fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        info!("Unmounting live view {}", self.id);
        self.cancel.cancel();
        self.connector.teardown().await;
    }
}

/// Dropping a view without `unmount` cancels both its connection and any
/// pending history fetch.
impl Drop for LiveView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
