//! crates/shop_notify_core/src/domain.rs
//!
//! Defines the pure, core data structures for the notification client.
//! These structs are independent of any transport, storage or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;

//=========================================================================================
// Session
//=========================================================================================

/// An opaque bearer credential issued by the backend at login.
///
/// A token is never empty: blank strings mean "no session".
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string, rejecting empty or whitespace-only input.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in log lines through `{:?}`; keep the secret out of them.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

//=========================================================================================
// Live feed
//=========================================================================================

/// A single notification pushed over the live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    position: u64,
    message: String,
    received_at: DateTime<Utc>,
}

impl FeedEvent {
    /// Zero-based arrival index within the owning feed.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The raw payload exactly as the server sent it.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// The ordered, append-only list of notifications for one view instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    events: Vec<FeedEvent>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the end of the feed and returns the stored event.
    pub fn append(&mut self, message: impl Into<String>) -> &FeedEvent {
        let position = self.events.len() as u64;
        self.events.push(FeedEvent {
            position,
            message: message.into(),
            received_at: Utc::now(),
        });
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[FeedEvent] {
        &self.events
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(FeedEvent::message)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Health of the live connection as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    /// Closed by the server, by a transport error, or by teardown. Terminal.
    Closed,
}

impl ConnectionStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_advance_to(self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::*;
        matches!(
            (self, next),
            (Idle, Connecting) | (Connecting, Open) | (Idle | Connecting | Open, Closed)
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Idle => "idle",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "connected",
            ConnectionStatus::Closed => "disconnected",
        };
        f.write_str(label)
    }
}

//=========================================================================================
// History
//=========================================================================================

/// A previously published piece of content, as returned by the history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// User input
//=========================================================================================

/// Raised by the input layer when a required form field is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The field '{0}' is required")]
    MissingField(&'static str),
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone)]
pub struct PostForm {
    pub content: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("content", &self.content)
    }
}
