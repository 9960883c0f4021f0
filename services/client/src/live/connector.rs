//! services/client/src/live/connector.rs
//!
//! The live feed connector: owns one persistent connection for the lifetime of a
//! mounted view. It authenticates the connection once it opens, appends every
//! inbound frame to the feed in arrival order and publishes the connection health.
//!
//! The connection is single-shot. Once it reaches `Closed` nothing reopens it; a
//! freshly mounted view creates a fresh connector.

use crate::live::{protocol::ClientMessage, session::SessionContext};
use shop_notify_core::domain::{ConnectionStatus, Feed};
use shop_notify_core::ports::{FeedChannel, FeedTransport, TransportEvent};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

//=========================================================================================
// Connector (before activation)
//=========================================================================================

/// A connector in the `Idle` state. Call [`FeedConnector::activate`] to start it.
pub struct FeedConnector {
    transport: Arc<dyn FeedTransport>,
    session: SessionContext,
    endpoint: Url,
    feed: watch::Sender<Feed>,
    status: watch::Sender<ConnectionStatus>,
}

impl FeedConnector {
    pub fn new(transport: Arc<dyn FeedTransport>, session: SessionContext, endpoint: Url) -> Self {
        let (feed, _) = watch::channel(Feed::new());
        let (status, _) = watch::channel(ConnectionStatus::Idle);
        Self {
            transport,
            session,
            endpoint,
            feed,
            status,
        }
    }

    /// Moves to `Connecting` and spawns the connection task. Cancelling `cancel`
    /// (or calling [`ConnectorHandle::teardown`]) closes the connection.
    pub fn activate(self, cancel: CancellationToken) -> ConnectorHandle {
        let status = self.status.subscribe();
        let feed = self.feed.subscribe();
        self.advance(ConnectionStatus::Connecting);
        let task = tokio::spawn(self.run(cancel.clone()));

        ConnectorHandle {
            cancel,
            task: Some(task),
            status,
            feed,
        }
    }

    /// Applies a status transition if the state machine allows it.
    fn advance(&self, next: ConnectionStatus) {
        self.status.send_if_modified(|current| {
            if current.can_advance_to(next) {
                debug!("Feed connection {} -> {}", current, next);
                *current = next;
                true
            } else {
                false
            }
        });
    }

    async fn run(self, cancel: CancellationToken) {
        info!("Opening notification connection to {}", self.endpoint);

        let opened = tokio::select! {
            _ = cancel.cancelled() => {
                info!("View torn down before the connection opened.");
                self.advance(ConnectionStatus::Closed);
                return;
            }
            opened = self.transport.open(&self.endpoint) => opened,
        };

        let mut channel = match opened {
            Ok(channel) => channel,
            Err(e) => {
                error!("Failed to open notification connection: {}", e);
                self.advance(ConnectionStatus::Closed);
                return;
            }
        };

        self.advance(ConnectionStatus::Open);
        info!("Notification connection is open.");
        self.send_handshake(channel.as_mut()).await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Closing notification connection on teardown.");
                    if let Err(e) = channel.close().await {
                        warn!("Close request failed: {}", e);
                    }
                    self.advance(ConnectionStatus::Closed);
                    break;
                }
                event = channel.next_event() => match event {
                    TransportEvent::Text(message) => {
                        debug!("New notification received: {}", message);
                        self.feed.send_modify(|feed| {
                            feed.append(message);
                        });
                    }
                    TransportEvent::Closed => {
                        info!("Notification connection closed by the server.");
                        self.advance(ConnectionStatus::Closed);
                        break;
                    }
                    TransportEvent::Error(e) => {
                        error!("Notification connection error: {}", e);
                        self.advance(ConnectionStatus::Closed);
                        break;
                    }
                },
            }
        }
    }

    /// Fire-and-forget: no acknowledgement is awaited and a failed send is not retried.
    async fn send_handshake(&self, channel: &mut dyn FeedChannel) {
        let Some(token) = self.session.token() else {
            debug!("No active session; connection stays unauthenticated.");
            return;
        };

        let frame = ClientMessage::Auth {
            token: token.as_str().to_string(),
        };
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode auth handshake: {}", e);
                return;
            }
        };
        if let Err(e) = channel.send_text(json).await {
            warn!("Failed to send auth handshake: {}", e);
        }
    }
}

//=========================================================================================
// Handle (after activation)
//=========================================================================================

/// The view-side handle to a running connector.
pub struct ConnectorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<ConnectionStatus>,
    feed: watch::Receiver<Feed>,
}

impl ConnectorHandle {
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn status_updates(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn feed(&self) -> watch::Receiver<Feed> {
        self.feed.clone()
    }

    /// Closes the connection and waits for the task to finish. Calling it again,
    /// or after the connection already closed, does nothing.
    pub async fn teardown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Feed connector task failed: {:?}", e);
            }
        }
    }
}

/// A handle dropped without `teardown` still stops the task; it closes the
/// channel on its own.
impl Drop for ConnectorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
