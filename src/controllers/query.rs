use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use tokio::sync::Mutex;

use super::QueryKey;
use crate::usecases::ApiError;

type Erased = Arc<dyn Any + Send + Sync>;
type Fetch = Shared<BoxFuture<'static, Result<Erased, ApiError>>>;

#[derive(Default)]
struct Entry {
    /// Bumped by every invalidation.
    generation: u64,
    /// Cached value and the generation its fetch started in.
    value: Option<(u64, Erased)>,
    stale: bool,
    in_flight: Option<(u64, Fetch)>,
}

/// Keyed cache of read results.
///
/// At most one fetch per key runs at a time; readers arriving meanwhile wait
/// for the same result. Failures are handed to every waiter and never cached.
#[derive(Default)]
pub struct QueryClient {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryClient {
    pub fn new() -> Self { Self::default() }

    /// Cached value for `key` unless it is missing or stale, in which case
    /// `fetcher` runs (or an already running fetch is joined).
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (generation, fetch) = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key.clone()).or_default();

            if let (Some((_, value)), false) = (&entry.value, entry.stale) {
                tracing::trace!("hit - {}", key);
                return Ok(downcast(&key, value.clone()));
            }

            match &entry.in_flight {
                Some((generation, fetch)) => {
                    tracing::trace!("joining - {}", key);
                    (*generation, fetch.clone())
                },
                None => {
                    tracing::debug!("fetching - {}", key);

                    let fetch = fetcher()
                        .map_ok(|v| Arc::new(v) as Erased)
                        .boxed()
                        .shared();
                    entry.in_flight = Some((entry.generation, fetch.clone()));

                    (entry.generation, fetch)
                },
            }
        };

        let res = fetch.await;

        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(&key) {
            if matches!(&entry.in_flight, Some((g, _)) if *g == generation) {
                entry.in_flight = None;
            }

            if let Ok(value) = &res {
                let newer_cached = matches!(&entry.value, Some((g, _)) if *g > generation);

                if !newer_cached {
                    entry.value = Some((generation, value.clone()));
                    entry.stale = entry.generation != generation;
                }
            }
        }
        drop(entries);

        match res {
            Ok(value) => Ok(downcast(&key, value)),
            Err(e) => {
                tracing::debug!("fetch failed - {}: {}", key, e);
                Err(e)
            },
        }
    }

    /// Current value regardless of staleness.
    pub async fn peek<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where T: Send + Sync + 'static {
        self.entries
            .lock()
            .await
            .get(key)
            .and_then(|e| e.value.as_ref())
            .map(|(_, v)| downcast(key, v.clone()))
    }

    /// Replaces the cached value without touching its staleness.
    pub async fn set<T>(&self, key: QueryKey, value: T)
    where T: Send + Sync + 'static {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_default();

        entry.value = Some((entry.generation, Arc::new(value)));
    }

    /// Marks `key` stale. A fetch running for it keeps going for the readers
    /// already waiting, but its result stays stale.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get_mut(key) {
            tracing::debug!("invalidated - {}", key);

            entry.generation += 1;
            entry.stale = true;
            entry.in_flight = None;
        }
    }

    pub async fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(key).await;
        }
    }

    /// `None` when nothing is cached under `key`.
    pub async fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries
            .lock()
            .await
            .get(key)
            .and_then(|e| e.value.as_ref().map(|_| e.stale))
    }

    pub async fn stale_keys(&self) -> HashSet<QueryKey> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|(_, e)| e.value.is_some() && e.stale)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;

        tracing::debug!("clearing {} entries", entries.len());
        entries.clear();
    }
}

fn downcast<T>(key: &QueryKey, value: Erased) -> Arc<T>
where T: Send + Sync + 'static {
    match value.downcast::<T>() {
        Ok(v) => v,
        Err(_) => unreachable!("`{}` cached under a different type", key),
    }
}
