//! Request-coalescing cache
//!
//! Holds one value fetched from the API. Callers arriving while a fetch is
//! running wait on that fetch instead of starting their own.

use crate::error::{LibraryError, Result};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

type SharedFetch<T> = Shared<BoxFuture<'static, std::result::Result<T, Arc<LibraryError>>>>;

struct Slot<T> {
    value: Option<T>,
    inflight: Option<SharedFetch<T>>,
    /// Bumped on invalidation so stale fetches do not repopulate the slot
    epoch: u64,
}

/// Cached value plus the fetch currently producing it
pub struct RequestCache<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> RequestCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: None,
                inflight: None,
                epoch: 0,
            })),
        }
    }

    /// Return the cached value, join the running fetch, or start `fetch`
    ///
    /// A failed fetch leaves the cache empty and every waiter gets the error.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (fetching, epoch) = {
            let mut slot = self.lock();
            if let Some(value) = &slot.value {
                trace!("Request cache hit");
                return Ok(value.clone());
            }

            match &slot.inflight {
                Some(running) => (running.clone(), slot.epoch),
                None => {
                    let started = fetch().map(|r| r.map_err(Arc::new)).boxed().shared();
                    slot.inflight = Some(started.clone());
                    (started, slot.epoch)
                }
            }
        };

        let result = fetching.await;

        let mut slot = self.lock();
        if slot.epoch == epoch {
            slot.inflight = None;
            if let Ok(value) = &result {
                slot.value = Some(value.clone());
            }
        }

        result.map_err(LibraryError::Shared)
    }

    /// Cached value without fetching
    pub fn peek(&self) -> Option<T> {
        self.lock().value.clone()
    }

    /// Replace the cached value
    pub fn set(&self, value: T) {
        let mut slot = self.lock();
        slot.value = Some(value);
        slot.inflight = None;
        slot.epoch += 1;
    }

    /// Drop the cached value and forget any running fetch
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.value = None;
        slot.inflight = None;
        slot.epoch += 1;
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for RequestCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for RequestCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RequestCache")
            .field("cached", &slot.value.is_some())
            .field("inflight", &slot.inflight.is_some())
            .finish()
    }
}
