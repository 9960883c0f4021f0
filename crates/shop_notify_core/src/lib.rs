pub mod domain;
pub mod ports;

pub use domain::{
    ConnectionStatus, Feed, FeedEvent, LoginForm, Post, PostForm, RegistrationForm, SessionToken,
    ValidationError,
};
pub use ports::{
    FeedChannel, FeedTransport, PortError, PortResult, SessionStore, ShopApi, TransportEvent,
};
