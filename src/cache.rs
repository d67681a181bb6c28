//! Keyed, time-bounded in-memory cache for remote query results
//!
//! Each remote operation owns one [`QueryCache`]. Entries stay servable while
//! retained, turn stale after the staleness window, and are evicted after the
//! retention window of disuse. Concurrent requests for the same key coalesce
//! into a single network call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::error::FetchError;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

#[derive(Debug, Clone)]
struct CachedValue<T> {
    value: T,
    fetched_at: Instant,
    last_used: Instant,
}

struct Slot<T: Clone> {
    value: Option<CachedValue<T>>,
    in_flight: Option<(u64, SharedFetch<T>)>,
}

impl<T: Clone> Slot<T> {
    fn empty() -> Self {
        Self {
            value: None,
            in_flight: None,
        }
    }
}

enum Plan<T: Clone> {
    Hit(T),
    Join(u64, SharedFetch<T>),
}

/// Observable state of one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStatus {
    /// A value is currently retained for this key
    pub has_value: bool,
    /// The retained value is older than the staleness window
    pub is_stale: bool,
    /// A network call for this key is in flight
    pub is_fetching: bool,
}

/// Cache for one remote operation, keyed by request identity
pub struct QueryCache<T: Clone> {
    stale_after: Duration,
    retain_for: Duration,
    next_fetch_id: AtomicU64,
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cache with the given staleness and retention windows
    #[must_use]
    pub fn new(stale_after: Duration, retain_for: Duration) -> Self {
        Self {
            stale_after,
            retain_for,
            next_fetch_id: AtomicU64::new(0),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Serve the retained value for `key`, or run `fetcher` exactly once.
    ///
    /// Joins an in-flight request for the same key instead of issuing a second
    /// network call. Failures surface immediately and are never cached, so the
    /// next call fetches again.
    pub async fn fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let plan = {
            let mut slots = self.slots.lock();
            self.evict_unused(&mut slots);
            let slot = slots.entry(key.to_owned()).or_insert_with(Slot::empty);
            if let Some(cached) = slot.value.as_mut() {
                cached.last_used = Instant::now();
                debug!(key, "query cache hit");
                Plan::Hit(cached.value.clone())
            } else if let Some((id, shared)) = &slot.in_flight {
                debug!(key, "joining in-flight query");
                Plan::Join(*id, shared.clone())
            } else {
                debug!(key, "query cache miss");
                let (id, shared) = self.launch(fetcher);
                slot.in_flight = Some((id, shared.clone()));
                Plan::Join(id, shared)
            }
        };

        match plan {
            Plan::Hit(value) => Ok(value),
            Plan::Join(id, shared) => self.settle(key, id, shared).await,
        }
    }

    /// Re-issue the network call for `key` unconditionally, overwriting the
    /// retained value on success.
    ///
    /// An identical request already in flight is joined rather than
    /// duplicated; the previous value stays servable until the new call
    /// succeeds.
    pub async fn refetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (id, shared) = {
            let mut slots = self.slots.lock();
            self.evict_unused(&mut slots);
            let slot = slots.entry(key.to_owned()).or_insert_with(Slot::empty);
            if let Some((id, shared)) = &slot.in_flight {
                debug!(key, "refetch joining in-flight query");
                (*id, shared.clone())
            } else {
                debug!(key, "refetch issuing network call");
                let (id, shared) = self.launch(fetcher);
                slot.in_flight = Some((id, shared.clone()));
                (id, shared)
            }
        };

        self.settle(key, id, shared).await
    }

    /// Current status of the entry for `key`
    #[must_use]
    pub fn status(&self, key: &str) -> QueryStatus {
        let slots = self.slots.lock();
        let slot = slots.get(key);
        let value = slot.and_then(|slot| slot.value.as_ref());
        QueryStatus {
            has_value: value.is_some(),
            is_stale: value.is_some_and(|cached| cached.fetched_at.elapsed() >= self.stale_after),
            is_fetching: slot.is_some_and(|slot| slot.in_flight.is_some()),
        }
    }

    fn launch<F, Fut>(&self, fetcher: F) -> (u64, SharedFetch<T>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        (id, fetcher().boxed().shared())
    }

    async fn settle(&self, key: &str, id: u64, shared: SharedFetch<T>) -> Result<T, FetchError> {
        let result = shared.await;

        let mut slots = self.slots.lock();
        let mut drop_slot = false;
        if let Some(slot) = slots.get_mut(key) {
            // Only the generation that launched this call may commit it; a
            // newer in-flight request must not be stomped by a late settle.
            if slot
                .in_flight
                .as_ref()
                .is_some_and(|(current, _)| *current == id)
            {
                slot.in_flight = None;
                match &result {
                    Ok(value) => {
                        let now = Instant::now();
                        slot.value = Some(CachedValue {
                            value: value.clone(),
                            fetched_at: now,
                            last_used: now,
                        });
                    }
                    Err(error) => {
                        debug!(key, %error, "query failed, nothing cached");
                        drop_slot = slot.value.is_none();
                    }
                }
            }
        }
        if drop_slot {
            slots.remove(key);
        }

        result
    }

    fn evict_unused(&self, slots: &mut HashMap<String, Slot<T>>) {
        let now = Instant::now();
        slots.retain(|_, slot| {
            slot.in_flight.is_some()
                || slot
                    .value
                    .as_ref()
                    .is_some_and(|cached| now.duration_since(cached.last_used) < self.retain_for)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    const STALE: Duration = Duration::from_secs(300);
    const RETAIN: Duration = Duration::from_secs(300);

    fn counted_ok(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, FetchError>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            .boxed()
        }
    }

    fn counted_err(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, FetchError>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::CurrentWeather {
                    message: "HTTP 500".to_string(),
                })
            }
            .boxed()
        }
    }

    fn slow_ok(
        calls: &Arc<AtomicUsize>,
        value: u32,
        delay: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, FetchError>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn serves_retained_value_without_second_call() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        let second = cache.fetch("k", counted_ok(&calls, 2)).await.unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        let a = cache.fetch("a", counted_ok(&calls, 1)).await.unwrap();
        let b = cache.fetch("b", counted_ok(&calls, 2)).await.unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetches_coalesce_into_one_call() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, second) = tokio::join!(
            cache.fetch("k", slow_ok(&calls, 7, Duration::from_millis(50))),
            cache.fetch("k", slow_ok(&calls, 8, Duration::from_millis(50))),
        );

        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_after_retention_window_of_disuse() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        tokio::time::advance(RETAIN + Duration::from_secs(1)).await;
        let value = cache.fetch("k", counted_ok(&calls, 2)).await.unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn access_resets_the_retention_window() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.fetch("k", counted_ok(&calls, 2)).await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        let value = cache.fetch("k", counted_ok(&calls, 3)).await.unwrap();

        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_value_stays_servable_until_evicted() {
        let cache = QueryCache::new(STALE, Duration::from_secs(600));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(400)).await;

        let status = cache.status("k");
        assert!(status.has_value);
        assert!(status.is_stale);

        let value = cache.fetch("k", counted_ok(&calls, 2)).await.unwrap();
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        let error = cache.fetch("k", counted_err(&calls)).await.unwrap_err();
        assert!(matches!(error, FetchError::CurrentWeather { .. }));

        let value = cache.fetch("k", counted_ok(&calls, 5)).await.unwrap();
        assert_eq!(value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refetch_bypasses_a_fresh_value() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        let refreshed = cache.refetch("k", counted_ok(&calls, 2)).await.unwrap();
        let served = cache.fetch("k", counted_ok(&calls, 3)).await.unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(served, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_joins_an_in_flight_call() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        let (fetched, refetched) = tokio::join!(
            cache.fetch("k", slow_ok(&calls, 7, Duration::from_millis(50))),
            cache.refetch("k", slow_ok(&calls, 9, Duration::from_millis(50))),
        );

        assert_eq!(fetched.unwrap(), 7);
        assert_eq!(refetched.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_the_previous_value() {
        let cache = QueryCache::new(STALE, RETAIN);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counted_ok(&calls, 1)).await.unwrap();
        let error = cache.refetch("k", counted_err(&calls)).await.unwrap_err();
        assert!(matches!(error, FetchError::CurrentWeather { .. }));

        let served = cache.fetch("k", counted_ok(&calls, 3)).await.unwrap();
        assert_eq!(served, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn status_reflects_in_flight_state() {
        let cache: QueryCache<u32> = QueryCache::new(STALE, RETAIN);
        assert_eq!(
            cache.status("missing"),
            QueryStatus {
                has_value: false,
                is_stale: false,
                is_fetching: false,
            }
        );
    }
}
