//! Per-producer client handles.
//!
//! A [`CacheClient`] is the per-thread face of a cache. It carries two
//! pieces of shared state the cache coordinator reaches into:
//!
//! - the **promotion list**: entries this client touched in the current
//!   frame, drained into the shared eviction queue by
//!   [`trim`](crate::cache::Cache::trim);
//! - the **completion gate**: a mutex/condvar pair other clients wait on
//!   when they hit an entry this client is still constructing.
//!
//! ```text
//!   thread A ── CacheClient ──┐             ┌── CacheClient ── thread B
//!                             ▼             ▼
//!                      ┌─────────────────────────┐
//!                      │        Cache<F>         │
//!                      │  roster: [A, B, …]      │
//!                      └─────────────────────────┘
//!
//!   miss on A:  A inserts a pending entry tagged creator=A, constructs,
//!               publishes, then broadcasts on A's gate.
//!   hit on B:   B sees the pending entry, waits on A's gate until the
//!               value is published.
//! ```
//!
//! Clients register in the cache's roster on creation and deregister on
//! drop; a dropped client's not-yet-drained promotion list is handed back
//! to the cache so its touches survive until the next trim.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

use crate::cache::Cache;
use crate::entry::{CacheRef, EntryInner};
use crate::family::Family;

/// Client state shared with the cache and with entries it created.
///
/// Entries keep an `Arc` to their creator, so the completion gate outlives
/// the public client handle; a waiter never races client teardown.
pub(crate) struct ClientShared<F: Family> {
    /// Entries touched in the current frame, in touch order.
    pub(crate) promote: Mutex<Vec<Arc<EntryInner<F>>>>,
    /// Gate taken by waiters on this client's pending entries.
    pub(crate) gate: Mutex<()>,
    /// Signaled when this client publishes a value.
    pub(crate) published: Condvar,
}

impl<F: Family> ClientShared<F> {
    pub(crate) fn new() -> Self {
        Self {
            promote: Mutex::new(Vec::new()),
            gate: Mutex::new(()),
            published: Condvar::new(),
        }
    }

    /// Blocks until `entry` (created by this client) is published.
    ///
    /// The publisher stores the value before taking the gate, so a waiter
    /// that re-checks under the gate either sees the value or is parked
    /// before the publisher can acquire the gate to broadcast.
    pub(crate) fn wait_until_published(&self, entry: &EntryInner<F>) {
        let mut gate = self.gate.lock();
        while !entry.is_complete() {
            self.published.wait(&mut gate);
        }
    }

    /// Wakes every waiter after a value was published.
    pub(crate) fn broadcast_published(&self) {
        drop(self.gate.lock());
        self.published.notify_all();
    }
}

/// Per-producer handle used for lookups.
///
/// Created with [`Cache::client`]. Each rendering thread holds its own
/// client; the handles themselves are cheap. Dropping the client folds its
/// pending frame touches back into the cache.
///
/// # Example
///
/// ```
/// use framecache::cache::Cache;
/// use framecache::family::{Constructed, Family};
///
/// struct Squares;
/// impl Family for Squares {
///     type Key = u32;
///     type Value = u64;
///     type Context = ();
///     fn construct(key: &u32, _cx: &mut ()) -> Constructed<u64> {
///         Constructed::new(u64::from(*key) * u64::from(*key), 8)
///     }
/// }
///
/// let cache = Cache::<Squares>::new();
/// let client = cache.client();
/// assert_eq!(*client.get(12, &mut ()), 144);
/// ```
pub struct CacheClient<'c, F: Family> {
    cache: &'c Cache<F>,
    shared: Arc<ClientShared<F>>,
}

impl<'c, F: Family> CacheClient<'c, F> {
    pub(crate) fn new(cache: &'c Cache<F>, shared: Arc<ClientShared<F>>) -> Self {
        Self { cache, shared }
    }

    /// Looks up `key`, constructing the value on a miss.
    ///
    /// On a hit the entry is touched for the current frame and the staged
    /// key is dropped (releasing any sub-references it holds). If another
    /// client is still constructing the entry, this call blocks until the
    /// value is published. On a miss this client constructs the value via
    /// [`Family::construct`] with `cx`, outside all cache locks.
    ///
    /// The returned handle is a strong reference owned by the caller.
    pub fn get(&self, key: F::Key, cx: &mut F::Context) -> CacheRef<F> {
        self.cache.lookup(&self.shared, key, cx)
    }

    /// The cache this client belongs to.
    #[inline]
    pub fn cache(&self) -> &'c Cache<F> {
        self.cache
    }
}

impl<F: Family> Drop for CacheClient<'_, F> {
    fn drop(&mut self) {
        self.cache.release_client(&self.shared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Constructed;

    struct Doubles;

    impl Family for Doubles {
        type Key = u32;
        type Value = u32;
        type Context = u32;

        fn construct(key: &u32, calls: &mut u32) -> Constructed<u32> {
            *calls += 1;
            Constructed::new(key * 2, 1)
        }
    }

    #[test]
    fn clients_share_entries() {
        let cache = Cache::<Doubles>::new();
        let mut calls = 0;
        let a = cache.client();
        let b = cache.client();

        let ra = a.get(21, &mut calls);
        let rb = b.get(21, &mut calls);

        assert_eq!(calls, 1);
        assert!(CacheRef::ptr_eq(&ra, &rb));
    }

    #[test]
    fn dropped_client_touches_survive_until_trim() {
        let cache = Cache::<Doubles>::new();
        let mut calls = 0;
        {
            let client = cache.client();
            client.get(1, &mut calls);
        }
        // The dropped client's promotion list was folded back; trim drains
        // it into the queue without losing the entry.
        cache.trim(usize::MAX);
        assert_eq!(cache.stats().items, 1);
    }

    #[test]
    fn cache_accessor_returns_owner() {
        let cache = Cache::<Doubles>::new();
        let client = cache.client();
        assert!(std::ptr::eq(client.cache(), &cache));
    }
}
