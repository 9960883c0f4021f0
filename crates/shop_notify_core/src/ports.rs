//! crates/shop_notify_core/src/ports.rs
//!
//! Defines the service contracts (traits) the notification client depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the concrete HTTP client, WebSocket library or storage.

use async_trait::async_trait;
use url::Url;

use crate::domain::{LoginForm, Post, PostForm, RegistrationForm, SessionToken};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The persistent connection could not be opened, or it dropped.
    #[error("Transport error: {0}")]
    Transport(String),
    /// A one-shot request failed on the network or returned a non-success status.
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The durable session storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Session storage
//=========================================================================================

/// Durable key-value storage holding the current session token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored token, or `None` when nothing is stored.
    async fn load(&self) -> PortResult<Option<SessionToken>>;

    async fn save(&self, token: &SessionToken) -> PortResult<()>;

    /// Wipes all stored session state. Clearing an empty store is not an error.
    async fn clear(&self) -> PortResult<()>;
}

//=========================================================================================
// Backend request/response API
//=========================================================================================

#[async_trait]
pub trait ShopApi: Send + Sync {
    /// Registers a new account and returns the server's confirmation message.
    async fn register(&self, form: &RegistrationForm) -> PortResult<String>;

    /// Exchanges credentials for a session token.
    async fn login(&self, form: &LoginForm) -> PortResult<SessionToken>;

    /// Fetches the most recent posts, newest first as ordered by the server.
    async fn recent_posts(&self, token: &SessionToken) -> PortResult<Vec<Post>>;

    async fn post_content(&self, token: &SessionToken, form: &PostForm) -> PortResult<()>;
}

//=========================================================================================
// Persistent duplex connection
//=========================================================================================

/// What the transport observed on an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound text frame, verbatim.
    Text(String),
    /// The peer closed the connection, or the stream ended.
    Closed,
    Error(String),
}

/// Opens persistent, message-framed connections.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Resolves once the connection is ready to carry frames.
    async fn open(&self, endpoint: &Url) -> PortResult<Box<dyn FeedChannel>>;
}

/// One open connection produced by a `FeedTransport`.
#[async_trait]
pub trait FeedChannel: Send {
    async fn send_text(&mut self, text: String) -> PortResult<()>;

    /// Waits for the next inbound event. Must be cancel-safe.
    async fn next_event(&mut self) -> TransportEvent;

    /// Requests an orderly close of the connection.
    async fn close(&mut self) -> PortResult<()>;
}
