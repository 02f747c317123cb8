//! Cache entries and the strong handles that reference them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                       Arc<EntryInner<F>>                            │
//!   │                                                                     │
//!   │   hash: u64                  bucket selection + fast compare        │
//!   │   weight: AtomicUsize        bytes counted against the trim budget  │
//!   │   last_used: AtomicU64       frame of the most recent touch         │
//!   │   queue_slot: AtomicUsize    position in the eviction queue         │
//!   │   unlinked: AtomicBool       set once the map has let go            │
//!   │   creator: Arc<ClientShared> completion rendezvous for waiters      │
//!   │   value: OnceLock<F::Value>  empty = pending, set = published       │
//!   │   key: F::Key                owns cross-cache strong references     │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//!   Strong references to one entry:
//!     • its bucket chain (while mapped)
//!     • its eviction-queue slot (while queued)
//!     • promotion lists (between a touch and the next trim)
//!     • every CacheRef held by producers or embedded in other caches' keys
//!
//!   The entry is destroyed when the last strong reference drops.
//! ```
//!
//! ## Key Components
//!
//! - `EntryInner<F>`: the uniformly laid-out record (crate-internal).
//! - [`CacheRef<F>`]: public strong handle to a completed entry.
//!
//! ## Handle Semantics
//!
//! Handles are opaque: [`CacheRef`] carries entry identity, and
//! [`CacheRef::key`] / [`CacheRef::value`] stand in for the interior
//! pointer arithmetic a C implementation would use. Cloning a handle
//! increments the entry's reference count, dropping it decrements; a
//! `None` in an `Option<CacheRef<F>>` plays the role of a tolerated null.
//!
//! ## Identity
//!
//! `Hash`, `PartialEq`, and `Eq` on `CacheRef` go by entry identity, not
//! value contents. This is what lets one cache's value act as a field of
//! another cache's key: composite keys hash their bitmap references by
//! identity, bitmap keys their outline reference, and so on.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::client::ClientShared;
use crate::family::Family;
use crate::queue::NO_SLOT;

/// One record in a cache: bookkeeping plus the embedded key and value.
///
/// The value slot doubles as the completion state: an empty `OnceLock` means
/// the entry is pending and its constructor is still running on the creating
/// client. Publication goes through `OnceLock::set` (release) and is observed
/// through `OnceLock::get` (acquire), so a reader that sees the value also
/// sees every write the constructor made.
pub(crate) struct EntryInner<F: Family> {
    pub(crate) hash: u64,
    pub(crate) weight: AtomicUsize,
    pub(crate) last_used: AtomicU64,
    /// Slot index in the eviction queue, `NO_SLOT` if unqueued. Read and
    /// written only under the queue lock.
    pub(crate) queue_slot: AtomicUsize,
    /// Set once the bucket chain has dropped its reference (eviction or
    /// empty). Promotion skips unlinked entries so a stale touch cannot
    /// resurrect them into the queue.
    pub(crate) unlinked: AtomicBool,
    pub(crate) creator: Arc<ClientShared<F>>,
    // Field order fixes drop order: the value is torn down before the key
    // releases its cross-cache references.
    pub(crate) value: OnceLock<F::Value>,
    pub(crate) key: F::Key,
}

impl<F: Family> EntryInner<F> {
    /// Creates a pending entry owned by `creator`, touched in `frame`.
    pub(crate) fn new_pending(
        hash: u64,
        key: F::Key,
        frame: u64,
        creator: Arc<ClientShared<F>>,
    ) -> Self {
        Self {
            hash,
            weight: AtomicUsize::new(0),
            last_used: AtomicU64::new(frame),
            queue_slot: AtomicUsize::new(NO_SLOT),
            unlinked: AtomicBool::new(false),
            creator,
            value: OnceLock::new(),
            key,
        }
    }

    /// Whether the value has been published.
    #[inline]
    pub(crate) fn is_complete(&self) -> bool {
        self.value.get().is_some()
    }
}

/// Strong reference to a completed cache entry.
///
/// Obtained from [`CacheClient::get`](crate::client::CacheClient::get).
/// Cloning increments the entry's reference count, dropping decrements it;
/// when the count reaches zero (no handle, no bucket chain, no queue slot)
/// the entry is destroyed: value first, then key, which in turn releases
/// any references the key holds into other caches.
///
/// The handle keeps its entry alive even after the cache evicts or forgets
/// it, so producers may hold results across frames without pinning the
/// budget.
///
/// # Identity
///
/// `Hash`/`Eq` compare entry identity (see the [module docs](self)), which
/// makes `CacheRef` directly usable as a field of another cache's key.
pub struct CacheRef<F: Family> {
    inner: Arc<EntryInner<F>>,
}

impl<F: Family> CacheRef<F> {
    /// Wraps a completed entry. Callers guarantee the value is published.
    pub(crate) fn from_completed(inner: Arc<EntryInner<F>>) -> Self {
        debug_assert!(inner.is_complete(), "handle to a pending entry");
        Self { inner }
    }

    /// The embedded key this entry was constructed from.
    #[inline]
    pub fn key(&self) -> &F::Key {
        &self.inner.key
    }

    /// The memoized value.
    #[inline]
    pub fn value(&self) -> &F::Value {
        self.inner
            .value
            .get()
            .expect("CacheRef always points at a completed entry")
    }

    /// The value's weight in bytes, as reported by the constructor.
    #[inline]
    pub fn weight(&self) -> usize {
        self.inner.weight.load(Ordering::Relaxed)
    }

    /// Whether two handles reference the same entry.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<F: Family> Clone for CacheRef<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Family> Deref for CacheRef<F> {
    type Target = F::Value;

    fn deref(&self) -> &F::Value {
        self.value()
    }
}

impl<F: Family> PartialEq for CacheRef<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<F: Family> Eq for CacheRef<F> {}

impl<F: Family> Hash for CacheRef<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl<F: Family> fmt::Debug for CacheRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRef")
            .field("entry", &Arc::as_ptr(&self.inner))
            .field("weight", &self.weight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::cache::Cache;
    use crate::family::Constructed;

    struct Numbers;

    impl Family for Numbers {
        type Key = u64;
        type Value = u64;
        type Context = ();

        fn construct(key: &u64, _cx: &mut ()) -> Constructed<u64> {
            Constructed::new(key * 10, 4)
        }
    }

    fn hash_of<T: Hash>(v: &T) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn handle_exposes_key_value_weight() {
        let cache = Cache::<Numbers>::new();
        let client = cache.client();
        let r = client.get(3, &mut ());
        assert_eq!(*r.key(), 3);
        assert_eq!(*r.value(), 30);
        assert_eq!(r.weight(), 4);
        // Deref goes to the value.
        assert_eq!(*r, 30);
    }

    #[test]
    fn identity_equality_and_hash() {
        let cache = Cache::<Numbers>::new();
        let client = cache.client();
        let a = client.get(1, &mut ());
        let b = client.get(1, &mut ());
        let c = client.get(2, &mut ());

        assert!(CacheRef::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn clone_keeps_entry_alive_after_empty() {
        let cache = Cache::<Numbers>::new();
        let client = cache.client();
        let r = client.get(5, &mut ());
        let held = r.clone();
        drop(r);
        cache.empty();
        // The cache forgot the entry; the handle still reads it.
        assert_eq!(*held.value(), 50);
    }
}
