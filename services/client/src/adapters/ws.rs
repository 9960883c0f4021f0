//! services/client/src/adapters/ws.rs
//!
//! This module contains the WebSocket adapter for the live notification feed.
//! It implements the `FeedTransport` and `FeedChannel` ports using `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shop_notify_core::ports::{FeedChannel, FeedTransport, PortError, PortResult, TransportEvent};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info};
use url::Url;

//=========================================================================================
// Transport
//=========================================================================================

/// Opens WebSocket connections to the notification endpoint.
#[derive(Clone, Debug)]
pub struct WsFeedTransport {
    connect_timeout: Duration,
}

impl WsFeedTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl FeedTransport for WsFeedTransport {
    async fn open(&self, endpoint: &Url) -> PortResult<Box<dyn FeedChannel>> {
        let (stream, response) = timeout(self.connect_timeout, connect_async(endpoint.as_str()))
            .await
            .map_err(|_| PortError::Transport(format!("Timed out connecting to {}", endpoint)))?
            .map_err(|e| PortError::Transport(format!("WebSocket connect failed: {}", e)))?;

        info!(
            "WebSocket connected to {} (status {}).",
            endpoint,
            response.status()
        );
        Ok(Box::new(WsFeedChannel { stream }))
    }
}

//=========================================================================================
// Channel
//=========================================================================================

/// One open WebSocket connection.
pub struct WsFeedChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedChannel for WsFeedChannel {
    async fn send_text(&mut self, text: String) -> PortResult<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| PortError::Transport(e.to_string()))
    }

    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Text(text),
                Some(Ok(Message::Binary(bytes))) => {
                    return TransportEvent::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Server sent close frame: {:?}", frame);
                    return TransportEvent::Closed;
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return TransportEvent::Error(e.to_string()),
                None => return TransportEvent::Closed,
            }
        }
    }

    async fn close(&mut self) -> PortResult<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| PortError::Transport(e.to_string()))
    }
}
