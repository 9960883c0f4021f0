//! services/client/src/live/state.rs
//!
//! Defines the client's shared state.

use crate::config::Config;
use crate::live::session::SessionContext;
use shop_notify_core::ports::{FeedTransport, ShopApi};
use std::sync::Arc;

//=========================================================================================
// ClientState (Shared Across All Views)
//=========================================================================================

/// The shared client state, created once at startup and passed to every view and flow.
#[derive(Clone)]
pub struct ClientState {
    pub config: Arc<Config>,
    pub session: SessionContext,
    pub api: Arc<dyn ShopApi>,
    pub transport: Arc<dyn FeedTransport>,
}
