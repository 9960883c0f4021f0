//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the shop backend. It implements the
//! `ShopApi` port from the `core` crate using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use shop_notify_core::domain::{LoginForm, Post, PostForm, RegistrationForm, SessionToken};
use shop_notify_core::ports::{PortError, PortResult, ShopApi};
use std::time::Duration;
use url::Url;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ShopApi` port against the backend's REST routes.
#[derive(Clone)]
pub struct HttpShopAdapter {
    client: Client,
    base_url: Url,
}

impl HttpShopAdapter {
    /// Creates a new `HttpShopAdapter` with a per-request timeout.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn route(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::Unexpected(format!("Invalid route '{}': {}", path, e)))
    }

    /// Sends a request and maps transport failures and non-2xx statuses onto `PortError`.
    async fn dispatch(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(PortError::Unauthorized);
        }

        // The backend reports failures as `{"error": "..."}`; fall back to the status line.
        let detail = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        Err(PortError::Request(format!("{}: {}", status, detail)))
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct PostRecord {
    id: i64,
    #[serde(alias = "content_text")]
    content: String,
    created_at: String,
}

impl PostRecord {
    fn to_domain(self) -> PortResult<Post> {
        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            PortError::Request(format!(
                "Post {} has an unreadable created_at '{}'",
                self.id, self.created_at
            ))
        })?;
        Ok(Post {
            id: self.id,
            content: self.content,
            created_at,
        })
    }
}

/// Accepts RFC 3339 as well as the database's `YYYY-MM-DD HH:MM:SS` (taken as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

//=========================================================================================
// `ShopApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl ShopApi for HttpShopAdapter {
    async fn register(&self, form: &RegistrationForm) -> PortResult<String> {
        let body = RegisterBody {
            username: &form.username,
            email: &form.email,
            password: &form.password,
        };
        let response = self
            .dispatch(self.client.post(self.route("register")?).json(&body))
            .await?;
        let reply: MessageBody = response
            .json()
            .await
            .map_err(|e| PortError::Request(e.to_string()))?;
        Ok(reply.message)
    }

    async fn login(&self, form: &LoginForm) -> PortResult<SessionToken> {
        let body = LoginBody {
            email: &form.email,
            password: &form.password,
        };
        let response = self
            .dispatch(self.client.post(self.route("login")?).json(&body))
            .await?;
        let reply: TokenBody = response
            .json()
            .await
            .map_err(|e| PortError::Request(e.to_string()))?;
        SessionToken::parse(reply.token)
            .ok_or_else(|| PortError::Request("Login response carried an empty token".to_string()))
    }

    async fn recent_posts(&self, token: &SessionToken) -> PortResult<Vec<Post>> {
        let request = self
            .client
            .get(self.route("recent-posts")?)
            .bearer_auth(token.as_str());
        let response = self.dispatch(request).await?;

        // An empty result set is serialized as `null` by the backend.
        let records: Option<Vec<PostRecord>> = response
            .json()
            .await
            .map_err(|e| PortError::Request(e.to_string()))?;

        records
            .unwrap_or_default()
            .into_iter()
            .map(PostRecord::to_domain)
            .collect()
    }

    async fn post_content(&self, token: &SessionToken, form: &PostForm) -> PortResult<()> {
        let request = self
            .client
            .post(self.route("post-content")?)
            .bearer_auth(token.as_str())
            .json(&ContentBody {
                content: &form.content,
            });
        self.dispatch(request).await?;
        Ok(())
    }
}
