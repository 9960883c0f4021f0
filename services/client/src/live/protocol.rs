//! services/client/src/live/protocol.rs
//!
//! Defines the messages the client sends over the notification connection.
//!
//! Inbound frames carry no envelope: each text frame is one notification, taken
//! verbatim, so there is no server-side message type here.

use serde::Serialize;

/// Represents the structured text messages the client can send to the server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticates the connection. Sent at most once, right after it opens.
    Auth { token: String },
}
