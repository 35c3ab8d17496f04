//! Per-entity query cache.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use moka::future::Cache;
use tokio::sync::{broadcast, watch};
use tracing::{debug, instrument, warn};

use super::{FetchStatus, MutationStatus, QueryEvent, QueryKey, Resource};
use crate::backend::BackendError;
use crate::config::CacheConfig;

/// Buffered events per observer before it starts lagging.
const EVENT_CAPACITY: usize = 32;

/// Entries are keyed by generation. Invalidation bumps the generation, so a
/// fetch that started before the invalidation can only ever fill a key that
/// nobody reads again.
type CacheKey = (QueryKey, u64);

/// In-memory cache of one entity collection.
///
/// Cheap to clone; clones share the same cache, status and observers.
pub struct QueryCache<R: Resource> {
    inner: Arc<QueryCacheInner<R>>,
}

struct QueryCacheInner<R: Resource> {
    resource: R,
    cache: Cache<CacheKey, Arc<Vec<R::Record>>>,
    generation: AtomicU64,
    events: broadcast::Sender<QueryEvent>,
    fetch_status: watch::Sender<FetchStatus>,
    mutation_status: watch::Sender<MutationStatus>,
    mutations_in_flight: AtomicUsize,
    pending_deletes: Mutex<HashSet<R::Id>>,
}

impl<R: Resource> Clone for QueryCache<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> QueryCache<R> {
    /// Create a cache in front of `resource`.
    #[must_use]
    pub fn new(resource: R, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(QueryCacheInner {
                resource,
                cache,
                generation: AtomicU64::new(0),
                events,
                fetch_status: watch::Sender::new(FetchStatus::Idle),
                mutation_status: watch::Sender::new(MutationStatus::Idle),
                mutations_in_flight: AtomicUsize::new(0),
                pending_deletes: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// The resource client behind this cache.
    #[must_use]
    pub fn resource(&self) -> &R {
        &self.inner.resource
    }

    /// The logical key of the cached collection.
    #[must_use]
    pub const fn key(&self) -> QueryKey {
        R::KEY
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Return the cached collection, loading it if needed.
    ///
    /// Concurrent callers share one backend call. Failures are not cached:
    /// the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns the backend error of the load, shared between all callers
    /// that waited on it.
    #[instrument(skip(self), fields(key = %R::KEY))]
    pub async fn fetch(&self) -> Result<Arc<Vec<R::Record>>, Arc<BackendError>> {
        let generation = self.inner.generation.load(Ordering::Acquire);
        let key = (R::KEY, generation);

        if let Some(records) = self.inner.cache.get(&key).await {
            debug!("Cache hit");
            return Ok(records);
        }

        let loaded_here = AtomicBool::new(false);
        self.inner.fetch_status.send_replace(FetchStatus::Loading);

        let result = self
            .inner
            .cache
            .try_get_with(key, async {
                debug!("Cache miss, loading from backend");
                loaded_here.store(true, Ordering::Release);
                self.inner.resource.load().await.map(Arc::new)
            })
            .await;

        // Only the caller whose loader actually ran reports the outcome, and
        // only while its generation is still the current one.
        let current = self.inner.generation.load(Ordering::Acquire) == generation;
        if loaded_here.load(Ordering::Acquire) && !current {
            debug!("Load superseded by an invalidation, not reported");
        }
        if loaded_here.load(Ordering::Acquire) && current {
            match &result {
                Ok(records) => {
                    let count = records.len();
                    self.inner
                        .fetch_status
                        .send_replace(FetchStatus::Ready { count });
                    self.notify(QueryEvent::Refreshed { key: R::KEY, count });
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load collection");
                    let message = e.to_string();
                    self.inner
                        .fetch_status
                        .send_replace(FetchStatus::Failed(message.clone()));
                    self.notify(QueryEvent::Failed {
                        key: R::KEY,
                        message,
                    });
                }
            }
        }

        result
    }

    /// Mark the cached collection stale.
    ///
    /// The next [`fetch`](Self::fetch) goes to the backend. If anyone is
    /// observing the collection, a refetch starts right away.
    #[instrument(skip(self), fields(key = %R::KEY))]
    pub async fn invalidate(&self) {
        let previous = self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate(&(R::KEY, previous)).await;
        self.inner.fetch_status.send_replace(FetchStatus::Idle);
        self.notify(QueryEvent::Invalidated { key: R::KEY });

        if self.observer_count() > 0 {
            debug!("Refetching for active observers");
            let cache = self.clone();
            tokio::spawn(async move {
                // Failures are reported to observers by fetch itself.
                let _ = cache.fetch().await;
            });
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Run a create/update/delete against the backend.
    ///
    /// On success the collection is invalidated first and `on_success` runs
    /// afterwards, so anything it triggers sees fresh data. On failure nothing
    /// is invalidated and the error is returned unchanged.
    ///
    /// The mutation status stays pending until every overlapping mutation
    /// has finished.
    ///
    /// # Errors
    ///
    /// Returns the error of `operation`.
    pub async fn mutate<T, Fut, F>(&self, operation: Fut, on_success: F) -> Result<T, BackendError>
    where
        Fut: Future<Output = Result<T, BackendError>>,
        F: FnOnce(&T),
    {
        self.inner.mutations_in_flight.fetch_add(1, Ordering::AcqRel);
        self.inner
            .mutation_status
            .send_replace(MutationStatus::Pending);

        match operation.await {
            Ok(value) => {
                self.invalidate().await;
                self.finish_mutation(MutationStatus::Idle);
                on_success(&value);
                Ok(value)
            }
            Err(e) => {
                warn!(key = %R::KEY, error = %e, "Mutation failed");
                self.finish_mutation(MutationStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Publish `outcome` once the last overlapping mutation is done.
    fn finish_mutation(&self, outcome: MutationStatus) {
        let remaining = self.inner.mutations_in_flight.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 {
            self.inner.mutation_status.send_replace(outcome);
        }
    }

    /// Claim the delete slot for one record.
    ///
    /// Returns `None` if a delete of the same record is already in flight.
    /// The slot is released when the guard drops.
    #[must_use]
    pub fn begin_delete(&self, id: R::Id) -> Option<DeleteGuard<R>> {
        let inserted = self
            .inner
            .pending_deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);

        inserted.then(|| DeleteGuard {
            cache: self.clone(),
            id,
        })
    }

    /// Whether a delete of `id` is in flight.
    #[must_use]
    pub fn is_delete_pending(&self, id: R::Id) -> bool {
        self.inner
            .pending_deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    // =========================================================================
    // Status & observers
    // =========================================================================

    /// State of the most recent fetch.
    #[must_use]
    pub fn fetch_status(&self) -> FetchStatus {
        self.inner.fetch_status.borrow().clone()
    }

    /// State of the most recent mutation.
    #[must_use]
    pub fn mutation_status(&self) -> MutationStatus {
        self.inner.mutation_status.borrow().clone()
    }

    /// Register an observer for change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueryEvent> {
        self.inner.events.subscribe()
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    fn notify(&self, event: QueryEvent) {
        // No observers is not an error.
        let _ = self.inner.events.send(event);
    }
}

/// Marks one record's delete as in flight until dropped.
pub struct DeleteGuard<R: Resource> {
    cache: QueryCache<R>,
    id: R::Id,
}

impl<R: Resource> Drop for DeleteGuard<R> {
    fn drop(&mut self) {
        self.cache
            .inner
            .pending_deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
