//! services/client/src/live/history.rs
//!
//! The history loader: one authenticated request/response fetch that seeds a
//! view's post list before live notifications start arriving.

use shop_notify_core::domain::{Post, SessionToken};
use shop_notify_core::ports::{PortResult, ShopApi};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What a history refresh did to the post list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// The list was overwritten with this many posts.
    Replaced(usize),
    /// The fetch failed; the list was left as it was.
    Failed,
    /// The response arrived after the view was torn down and was dropped.
    Discarded,
}

#[derive(Clone)]
pub struct HistoryLoader {
    api: Arc<dyn ShopApi>,
}

impl HistoryLoader {
    pub fn new(api: Arc<dyn ShopApi>) -> Self {
        Self { api }
    }

    /// Fetches the recent posts with `token` as the bearer credential.
    pub async fn load_history(&self, token: &SessionToken) -> PortResult<Vec<Post>> {
        self.api.recent_posts(token).await
    }

    /// Fetches and, unless `cancel` fires first, replaces the whole post list.
    /// The fetch is raced against `cancel`; once it completes the list is written
    /// without another await point. Failures are logged and never retried.
    pub async fn refresh(
        &self,
        token: &SessionToken,
        posts: &watch::Sender<Vec<Post>>,
        cancel: &CancellationToken,
    ) -> HistoryOutcome {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Discarding history fetch for a torn-down view.");
                return HistoryOutcome::Discarded;
            }
            fetched = self.load_history(token) => fetched,
        };

        match fetched {
            Ok(fetched) => {
                let count = fetched.len();
                posts.send_replace(fetched);
                info!("Loaded {} recent posts.", count);
                HistoryOutcome::Replaced(count)
            }
            Err(e) => {
                error!("Error fetching posts: {}", e);
                HistoryOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::testing::{post, token, PostsReply, StubShopApi};
    use shop_notify_core::ports::PortError;
    use tokio::sync::oneshot;

    fn ids(posts: &watch::Sender<Vec<Post>>) -> Vec<i64> {
        posts.borrow().iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn second_load_replaces_the_first() {
        let api = StubShopApi::with_posts(vec![
            PostsReply::Ready(Ok(vec![post(1, "first drop")])),
            PostsReply::Ready(Ok(vec![post(2, "second drop")])),
        ]);
        let loader = HistoryLoader::new(api);
        let (posts, _rx) = watch::channel(Vec::new());
        let cancel = CancellationToken::new();

        assert_eq!(
            loader.refresh(&token("abc"), &posts, &cancel).await,
            HistoryOutcome::Replaced(1)
        );
        assert_eq!(
            loader.refresh(&token("abc"), &posts, &cancel).await,
            HistoryOutcome::Replaced(1)
        );
        assert_eq!(ids(&posts), vec![2]);
    }

    #[tokio::test]
    async fn failure_keeps_the_previous_list() {
        let api = StubShopApi::with_posts(vec![
            PostsReply::Ready(Ok(vec![post(7, "kept")])),
            PostsReply::Ready(Err(PortError::Request("502 Bad Gateway".to_string()))),
        ]);
        let loader = HistoryLoader::new(api);
        let (posts, _rx) = watch::channel(Vec::new());
        let cancel = CancellationToken::new();

        loader.refresh(&token("abc"), &posts, &cancel).await;
        assert_eq!(
            loader.refresh(&token("abc"), &posts, &cancel).await,
            HistoryOutcome::Failed
        );
        assert_eq!(ids(&posts), vec![7]);
    }

    #[tokio::test]
    async fn late_response_is_ignored() {
        let (release, gate) = oneshot::channel();
        let api = StubShopApi::with_posts(vec![PostsReply::Gated(gate)]);
        let loader = HistoryLoader::new(api);
        let (posts, _rx) = watch::channel(Vec::new());
        let posts = Arc::new(posts);
        let cancel = CancellationToken::new();

        let pending = {
            let (posts, cancel) = (posts.clone(), cancel.clone());
            tokio::spawn(async move { loader.refresh(&token("abc"), &posts, &cancel).await })
        };

        cancel.cancel();
        assert_eq!(pending.await.unwrap(), HistoryOutcome::Discarded);

        // The gate may already be gone with the dropped fetch.
        let _ = release.send(Ok(vec![post(1, "too late")]));
        assert!(posts.borrow().is_empty());
    }

    #[tokio::test]
    async fn teardown_before_the_fetch_completes_never_writes() {
        let (release, gate) = oneshot::channel();
        let api = StubShopApi::with_posts(vec![PostsReply::Gated(gate)]);
        let loader = HistoryLoader::new(api);
        let (posts, _rx) = watch::channel(vec![post(3, "seeded")]);
        let cancel = CancellationToken::new();
        let session = token("abc");

        let refresh = loader.refresh(&session, &posts, &cancel);
        tokio::pin!(refresh);
        // Let the fetch start and park on the gate.
        assert!(futures::poll!(refresh.as_mut()).is_pending());

        cancel.cancel();
        assert_eq!(refresh.await, HistoryOutcome::Discarded);
        assert!(release.send(Ok(vec![post(1, "too late")])).is_err());
        assert_eq!(ids(&posts), vec![3]);
    }
}
