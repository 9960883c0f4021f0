//! In-process fakes for the ports, shared by the live layer's unit tests.

use async_trait::async_trait;
use shop_notify_core::domain::{LoginForm, Post, PostForm, RegistrationForm, SessionToken};
use shop_notify_core::ports::{
    FeedChannel, FeedTransport, PortError, PortResult, ShopApi, TransportEvent,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use url::Url;

pub fn endpoint() -> Url {
    Url::parse("ws://localhost:8081/ws").unwrap()
}

pub fn token(raw: &str) -> SessionToken {
    SessionToken::parse(raw).unwrap()
}

pub fn post(id: i64, content: &str) -> Post {
    Post {
        id,
        content: content.to_string(),
        created_at: chrono::Utc::now(),
    }
}

//=========================================================================================
// Feed transport
//=========================================================================================

/// Everything a scripted connection observed, in order.
#[derive(Default)]
pub struct Journal {
    pub entries: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
}

impl Journal {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix("send:").map(str::to_string))
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A transport whose single connection replays events pushed by the test.
pub struct ScriptedTransport {
    channel: Mutex<Option<ScriptedChannel>>,
    refuse: bool,
    pub journal: Arc<Journal>,
}

impl ScriptedTransport {
    /// Returns the transport plus the sender that feeds its inbound events.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let journal = Arc::new(Journal::default());
        let channel = ScriptedChannel {
            inbound: rx,
            journal: journal.clone(),
        };
        let transport = Arc::new(Self {
            channel: Mutex::new(Some(channel)),
            refuse: false,
            journal,
        });
        (transport, tx)
    }

    /// A transport whose connection never opens.
    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            channel: Mutex::new(None),
            refuse: true,
            journal: Arc::new(Journal::default()),
        })
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn open(&self, _endpoint: &Url) -> PortResult<Box<dyn FeedChannel>> {
        if self.refuse {
            return Err(PortError::Transport("connection refused".to_string()));
        }
        let channel = self
            .channel
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| PortError::Transport("already opened".to_string()))?;
        Ok(Box::new(channel))
    }
}

pub struct ScriptedChannel {
    inbound: mpsc::UnboundedReceiver<TransportEvent>,
    journal: Arc<Journal>,
}

#[async_trait]
impl FeedChannel for ScriptedChannel {
    async fn send_text(&mut self, text: String) -> PortResult<()> {
        self.journal
            .entries
            .lock()
            .unwrap()
            .push(format!("send:{}", text));
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        let event = self.inbound.recv().await.unwrap_or(TransportEvent::Closed);
        if let TransportEvent::Text(text) = &event {
            self.journal
                .entries
                .lock()
                .unwrap()
                .push(format!("recv:{}", text));
        }
        event
    }

    async fn close(&mut self) -> PortResult<()> {
        self.journal.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//=========================================================================================
// Backend API
//=========================================================================================

/// A scripted reply for `recent_posts`; `Gated` waits for the test to release it.
pub enum PostsReply {
    Ready(PortResult<Vec<Post>>),
    Gated(oneshot::Receiver<PortResult<Vec<Post>>>),
}

#[derive(Default)]
pub struct StubShopApi {
    pub posts: tokio::sync::Mutex<VecDeque<PostsReply>>,
    pub login_token: Mutex<Option<SessionToken>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubShopApi {
    pub fn with_posts(replies: Vec<PostsReply>) -> Arc<Self> {
        Arc::new(Self {
            posts: tokio::sync::Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ShopApi for StubShopApi {
    async fn register(&self, form: &RegistrationForm) -> PortResult<String> {
        self.record(format!("register:{}", form.username));
        if form.username == "taken" {
            return Err(PortError::Request("500: Failed to register user".to_string()));
        }
        Ok("User registered successfully!".to_string())
    }

    async fn login(&self, form: &LoginForm) -> PortResult<SessionToken> {
        self.record(format!("login:{}", form.email));
        self.login_token
            .lock()
            .unwrap()
            .clone()
            .ok_or(PortError::Unauthorized)
    }

    async fn recent_posts(&self, token: &SessionToken) -> PortResult<Vec<Post>> {
        self.record(format!("recent_posts:{}", token.as_str()));
        let reply = self.posts.lock().await.pop_front();
        match reply {
            Some(PostsReply::Ready(result)) => result,
            Some(PostsReply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(PortError::Request("gate dropped".to_string()))),
            None => Ok(Vec::new()),
        }
    }

    async fn post_content(&self, token: &SessionToken, form: &PostForm) -> PortResult<()> {
        self.record(format!("post_content:{}:{}", token.as_str(), form.content));
        Ok(())
    }
}
