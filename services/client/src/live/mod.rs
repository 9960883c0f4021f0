pub mod account;
pub mod connector;
pub mod history;
pub mod protocol;
pub mod session;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export the pieces a front end needs to drive the live layer.
pub use account::{landing_route, login, logout, register, submit_post, Notice, Route};
pub use connector::{ConnectorHandle, FeedConnector};
pub use history::{HistoryLoader, HistoryOutcome};
pub use session::SessionContext;
pub use state::ClientState;
pub use view::{LiveView, ViewOptions};
