//! services/client/src/live/account.rs
//!
//! Registration, login, logout and content submission. These are the only
//! flows that mutate the session, and the only ones that surface a one-shot
//! notice to the user instead of a passive status.

use crate::live::{session::SessionContext, state::ClientState};
use shop_notify_core::domain::{LoginForm, PostForm, RegistrationForm};
use tracing::{error, info, warn};

/// A one-shot message for the user (toast, alert, CLI line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Failure(text) => text,
        }
    }
}

/// Where the "Get Started" entry point sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Content,
    Register,
}

pub fn landing_route(session: &SessionContext) -> Route {
    if session.is_authenticated() {
        Route::Content
    } else {
        Route::Register
    }
}

pub async fn register(state: &ClientState, form: RegistrationForm) -> Notice {
    if let Err(e) = form.validate() {
        return Notice::Failure(e.to_string());
    }

    match state.api.register(&form).await {
        Ok(message) => {
            info!("Registered account for {}", form.email);
            Notice::Success(message)
        }
        Err(e) => {
            error!("Registration failed: {}", e);
            Notice::Failure("Failed to register".to_string())
        }
    }
}

pub async fn login(state: &ClientState, form: LoginForm) -> Notice {
    if let Err(e) = form.validate() {
        return Notice::Failure(e.to_string());
    }

    match state.api.login(&form).await {
        Ok(token) => {
            state.session.set_token(token).await;
            info!("Logged in as {}", form.email);
            Notice::Success("Login Successful!".to_string())
        }
        Err(e) => {
            error!("Login failed: {}", e);
            Notice::Failure("Login Failed".to_string())
        }
    }
}

pub async fn logout(state: &ClientState) -> Notice {
    state.session.clear_session().await;
    info!("Logged out.");
    Notice::Success("Logged out".to_string())
}

pub async fn submit_post(state: &ClientState, form: PostForm) -> Notice {
    if let Err(e) = form.validate() {
        return Notice::Failure(e.to_string());
    }
    let Some(token) = state.session.token() else {
        warn!("Refusing to post content without a session.");
        return Notice::Failure("Please log in to post content".to_string());
    };

    match state.api.post_content(&token, &form).await {
        Ok(()) => Notice::Success("Content posted successfully!".to_string()),
        Err(e) => {
            error!("Posting content failed: {}", e);
            Notice::Failure("Failed to post content".to_string())
        }
    }
}
