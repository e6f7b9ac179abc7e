use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};

use super::query_key::QueryKey;
use crate::error::{ClientError, Result};

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V>>>;

struct Entry<V> {
    data: Option<V>,
    error: Option<ClientError>,
    fetched_at: Option<Instant>,
    /// Highest fetch id issued before the entry was last invalidated.
    invalidated_at: Option<u64>,
    /// Highest fetch id whose data has been written (or issued before a
    /// `set_data`).
    newest_settled: Option<u64>,
    in_flight: Option<(u64, SharedFetch<V>)>,
}

impl<V> Entry<V> {
    fn empty() -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            invalidated_at: None,
            newest_settled: None,
            in_flight: None,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.data.is_some()
            && self.invalidated_at.is_none()
            && self
                .fetched_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<V> {
    pub data: Option<V>,
    pub is_loading: bool,
    pub error: Option<ClientError>,
    pub is_stale: bool,
}

/// Cache of asynchronous fetch results keyed by [`QueryKey`].
///
/// A read returns cached data while it is fresh; otherwise it fetches.
/// Reads of a key with a fetch already in flight join that fetch. Whichever
/// fetch settles last owns the entry, but data from a fetch that was
/// superseded or invalidated while in flight is kept stale. Invalidation
/// only marks entries stale; it never edits their data.
pub struct QueryCache<V> {
    entries: Arc<DashMap<QueryKey, Entry<V>>>,
    fetch_seq: Arc<AtomicU64>,
    stale_time: Duration,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            fetch_seq: self.fetch_seq.clone(),
            stale_time: self.stale_time,
        }
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            fetch_seq: Arc::new(AtomicU64::new(0)),
            stale_time,
        }
    }

    pub async fn query<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let pending = {
            let mut entry = self.entries.entry(key.clone()).or_insert_with(Entry::empty);

            if entry.is_fresh(self.stale_time) {
                if let Some(data) = &entry.data {
                    tracing::trace!("cache hit {}", key);
                    return Ok(data.clone());
                }
            }

            let joined = entry.in_flight.as_ref().map(|(_, shared)| shared.clone());
            match joined {
                Some(shared) => {
                    tracing::trace!("joining in-flight fetch for {}", key);
                    shared
                }
                None => {
                    let id = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!("fetching {} (#{})", key, id);

                    let entries = self.entries.clone();
                    let settle_key = key.clone();
                    let request = fetch();
                    let shared = async move {
                        let result = request.await;
                        settle(&entries, &settle_key, id, &result);
                        result
                    }
                    .boxed()
                    .shared();

                    entry.in_flight = Some((id, shared.clone()));
                    shared
                }
            }
        };

        pending.await
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState<V>> {
        self.entries.get(key).map(|entry| QueryState {
            data: entry.data.clone(),
            is_loading: entry.in_flight.is_some(),
            error: entry.error.clone(),
            is_stale: !entry.is_fresh(self.stale_time),
        })
    }

    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        self.entries.get(key).and_then(|entry| entry.data.clone())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Stores a server-confirmed value as fresh data.
    pub fn set_data(&self, key: QueryKey, value: V) {
        let issued = self.fetch_seq.load(Ordering::SeqCst);
        let mut entry = self.entries.entry(key).or_insert_with(Entry::empty);
        entry.data = Some(value);
        entry.error = None;
        entry.fetched_at = Some(Instant::now());
        entry.invalidated_at = None;
        // Fetches already in flight hold older data than this value.
        entry.newest_settled = entry.newest_settled.max(Some(issued));
    }

    /// Drops the entry. A fetch still in flight for it will not recreate it.
    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    pub fn invalidate(&self, key: &QueryKey) {
        let issued = self.fetch_seq.load(Ordering::SeqCst);
        if let Some(mut entry) = self.entries.get_mut(key) {
            mark_invalid(entry.value_mut(), issued);
            tracing::debug!("invalidated {}", key);
        }
    }

    /// Marks every entry of `resource` stale.
    pub fn invalidate_resource(&self, resource: &str) {
        let issued = self.fetch_seq.load(Ordering::SeqCst);
        for mut entry in self.entries.iter_mut() {
            if entry.key().resource == resource {
                mark_invalid(entry.value_mut(), issued);
            }
        }
        tracing::debug!("invalidated {}", resource);
    }

    /// Applies `edit` to the data of every entry of `resource` that has some.
    pub fn update_where(&self, resource: &str, mut edit: impl FnMut(&mut V)) {
        for mut entry in self.entries.iter_mut() {
            if entry.key().resource != resource {
                continue;
            }
            if let Some(data) = entry.value_mut().data.as_mut() {
                edit(data);
            }
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mark_invalid<V>(entry: &mut Entry<V>, issued: u64) {
    entry.invalidated_at = Some(issued);
    // Later reads must not join a fetch issued before the invalidation.
    entry.in_flight = None;
}

fn settle<V: Clone>(
    entries: &DashMap<QueryKey, Entry<V>>,
    key: &QueryKey,
    id: u64,
    result: &Result<V>,
) {
    let Some(mut entry) = entries.get_mut(key) else {
        return;
    };

    if entry.in_flight.as_ref().is_some_and(|(current, _)| *current == id) {
        entry.in_flight = None;
    }

    match result {
        Ok(value) => {
            let superseded = entry.newest_settled.is_some_and(|newest| id <= newest);
            let predates_invalidation = entry.invalidated_at.is_some_and(|at| id <= at);

            entry.data = Some(value.clone());
            entry.error = None;
            entry.fetched_at = Some(Instant::now());

            if superseded || predates_invalidation {
                // Out-of-order data still wins, but the next read refetches.
                let mark = entry
                    .invalidated_at
                    .max(entry.newest_settled)
                    .unwrap_or(id)
                    .max(id);
                entry.invalidated_at = Some(mark);
            } else {
                entry.invalidated_at = None;
            }
            entry.newest_settled = entry.newest_settled.max(Some(id));
        }
        Err(e) => {
            tracing::debug!("fetch #{} for {} failed: {}", id, key, e);
            entry.error = Some(e.clone());
        }
    }
}
