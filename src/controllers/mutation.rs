use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;

use super::{QueryClient, QueryKey};
use crate::usecases::{Action, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug)]
struct State<O> {
    status: MutationStatus,
    data: Option<O>,
    error: Option<ApiError>,
}

type Run<I, O> = Box<dyn Fn(I) -> BoxFuture<'static, Result<O, ApiError>> + Send + Sync>;

/// A write whose success makes a fixed set of queries stale.
pub struct Mutation<I, O> {
    action: Action,
    run: Run<I, O>,
    invalidates: fn(&O) -> Vec<QueryKey>,
    client: Arc<QueryClient>,
    state: Mutex<State<O>>,
}

impl<I, O> Mutation<I, O>
where
    I: Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(
        client: Arc<QueryClient>,
        action: Action,
        run: F,
        invalidates: fn(&O) -> Vec<QueryKey>,
    ) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ApiError>> + Send + 'static,
    {
        Self {
            action,
            run: Box::new(move |data| run(data).boxed()),
            invalidates,
            client,
            state: Mutex::new(State {
                status: MutationStatus::Idle,
                data: None,
                error: None,
            }),
        }
    }

    #[tracing::instrument(skip(self, data), fields(action = %self.action))]
    pub async fn mutate(&self, data: I) -> Result<O, ApiError> {
        {
            let mut state = self.state.lock().await;
            state.status = MutationStatus::Pending;
            state.error = None;
        }

        let res = (self.run)(data).await;

        match &res {
            Ok(out) => {
                let keys = (self.invalidates)(out);
                tracing::trace!("invalidates - {:?}", keys);
                self.client.invalidate_all(&keys).await;
            },
            Err(e) => tracing::debug!("failed - {}", e),
        }

        let mut state = self.state.lock().await;
        match &res {
            Ok(out) => {
                state.status = MutationStatus::Success;
                state.data = Some(out.clone());
            },
            Err(e) => {
                state.status = MutationStatus::Error;
                state.error = Some(e.clone());
            },
        }

        res
    }

    pub async fn status(&self) -> MutationStatus { self.state.lock().await.status }

    pub async fn is_pending(&self) -> bool { self.status().await == MutationStatus::Pending }

    /// Output of the last successful run.
    pub async fn data(&self) -> Option<O> { self.state.lock().await.data.clone() }

    /// Error of the last run, if it failed.
    pub async fn error(&self) -> Option<ApiError> { self.state.lock().await.error.clone() }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;

        state.status = MutationStatus::Idle;
        state.data = None;
        state.error = None;
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::entities::PostId;

    fn noop(_: &u32) -> Vec<QueryKey> { vec![] }

    #[tokio::test]
    async fn idle_pending_success() {
        let client = Arc::new(QueryClient::new());
        let (tx, rx) = oneshot::channel::<()>();
        let rx = Arc::new(Mutex::new(Some(rx)));

        let m = Arc::new(Mutation::new(
            client,
            Action::CreatePost,
            move |n: u32| {
                let rx = rx.clone();
                async move {
                    if let Some(rx) = rx.lock().await.take() {
                        let _ = rx.await;
                    }
                    Ok(n + 1)
                }
            },
            noop,
        ));
        assert_eq!(m.status().await, MutationStatus::Idle);

        let running = {
            let m = m.clone();
            tokio::spawn(async move { m.mutate(1).await })
        };
        tokio::time::sleep(::std::time::Duration::from_millis(20)).await;
        assert!(m.is_pending().await);

        let _ = tx.send(());
        assert_eq!(running.await.unwrap().unwrap(), 2);
        assert_eq!(m.status().await, MutationStatus::Success);
        assert_eq!(m.data().await, Some(2));

        m.reset().await;
        assert_eq!(m.status().await, MutationStatus::Idle);
        assert_eq!(m.data().await, None);
    }

    #[tokio::test]
    async fn failure_invalidates_nothing() {
        let client = Arc::new(QueryClient::new());
        client.set(QueryKey::RecentPosts, 1u32).await;

        let m = Mutation::new(
            client.clone(),
            Action::DeletePost,
            |_: ()| async {
                Err::<PostId, _>(ApiError::Precondition {
                    action: Action::DeletePost,
                    message: "no image".to_string(),
                })
            },
            |_: &PostId| vec![QueryKey::RecentPosts],
        );

        m.mutate(()).await.unwrap_err();

        assert_eq!(m.status().await, MutationStatus::Error);
        assert_eq!(m.error().await.map(|e| e.action()), Some(Action::DeletePost));
        assert_eq!(client.is_stale(&QueryKey::RecentPosts).await, Some(false));
    }

    #[tokio::test]
    async fn success_invalidates_declared_keys() {
        let client = Arc::new(QueryClient::new());
        client.set(QueryKey::RecentPosts, 1u32).await;
        client.set(QueryKey::CurrentUser, 1u32).await;

        let m = Mutation::new(
            client.clone(),
            Action::CreatePost,
            |_: ()| async { Ok(PostId::from("p")) },
            |_: &PostId| vec![QueryKey::RecentPosts],
        );

        m.mutate(()).await.unwrap();

        assert_eq!(
            client.stale_keys().await,
            [QueryKey::RecentPosts].into_iter().collect()
        );
    }
}
