//! # Generational Cache Coordinator
//!
//! One [`Cache`] memoizes one [`Family`] of render products across frames.
//! It owns the bucketed map, the LRU eviction queue, the size accounting,
//! and the client roster, and coordinates concurrent lookups with a
//! "first writer constructs, others wait" protocol.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                              Cache<F>                                 │
//!   │                                                                       │
//!   │   ┌─────────────────────────┐        ┌─────────────────────────────┐  │
//!   │   │  BucketMap<F>           │        │  Mutex<EvictQueue>          │  │
//!   │   │  hash & mask → chain    │        │  LRU ──────────► MRU        │  │
//!   │   │  one Arc per entry      │        │  one Arc per queued entry   │  │
//!   │   └─────────────────────────┘        └─────────────────────────────┘  │
//!   │                                                                       │
//!   │   ┌─────────────────────────┐        ┌─────────────────────────────┐  │
//!   │   │  roster: [ClientShared] │        │  counters: size/items/      │  │
//!   │   │  promotion lists +      │        │  hits/misses/evictions      │  │
//!   │   │  completion gates       │        │  cur_frame: AtomicU64       │  │
//!   │   └─────────────────────────┘        └─────────────────────────────┘  │
//!   └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lookup Protocol
//!
//! ```text
//!   get(key):
//!     │
//!     ├─► lock bucket, scan chain (hash, then key equality)
//!     │
//!     ├─► HIT ──► touch for this frame, clone entry, unlock
//!     │             │
//!     │             ├── value published? ──► return handle
//!     │             └── pending? ──► wait on creator's gate ──► return
//!     │
//!     └─► MISS ─► insert pending entry (creator = this client), unlock
//!                   │
//!                   ├── construct(key, cx)    ← outside all locks
//!                   ├── add weight, publish value (release store)
//!                   └── broadcast on own gate ──► return handle
//! ```
//!
//! Exactly one client constructs any given key: insertion happens under the
//! bucket lock, so a racing client finds the pending entry and waits
//! instead of constructing a duplicate.
//!
//! ## Frames, Promotion, Eviction
//!
//! The frame counter advances at each [`trim`](Cache::trim). A hit in a
//! frame the entry has not been touched in pushes it onto the client's
//! promotion list; `trim` folds all promotion lists into the queue tail,
//! then evicts from the head until the budget is met, stopping at the first
//! entry touched (or created) in the ending frame. Construction counts as
//! the creation frame's touch.
//!
//! ## Locking
//!
//! | Lock                | Guards                          | Held during    |
//! |---------------------|---------------------------------|----------------|
//! | bucket mutex        | one chain                       | scan + insert  |
//! | queue mutex         | eviction queue, trim/empty      | trim, empty    |
//! | roster mutex        | client list                     | create/drop    |
//! | client gate + cond  | completion of pending entries   | publish / wait |
//!
//! No lock is held while a constructor runs, and the lookup path never
//! holds two locks at once.

use parking_lot::Mutex;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::{CacheClient, ClientShared};
use crate::entry::{CacheRef, EntryInner};
use crate::family::Family;
use crate::map::{hash_key, BucketMap};
use crate::metrics::{CacheCounters, CacheStats};
use crate::queue::{EvictQueue, SlotId, NO_SLOT};

/// Bucket count used by [`Cache::new`].
pub const DEFAULT_BUCKET_COUNT: usize = 1024;

/// A concurrent, generational cache for one family of render products.
///
/// Create one per family with [`Cache::new`] or via
/// [`CacheBuilder`](crate::builder::CacheBuilder), hand each rendering
/// thread a [`client`](Cache::client), and call [`trim`](Cache::trim) from
/// a single coordinator at every frame boundary.
///
/// # Example
///
/// ```
/// use framecache::cache::Cache;
/// use framecache::family::{Constructed, Family};
///
/// struct Rasters;
/// impl Family for Rasters {
///     type Key = (u32, u32);
///     type Value = Vec<u8>;
///     type Context = ();
///     fn construct(key: &(u32, u32), _cx: &mut ()) -> Constructed<Vec<u8>> {
///         let buf = vec![0u8; (key.0 * key.1) as usize];
///         let weight = buf.len();
///         Constructed::new(buf, weight)
///     }
/// }
///
/// let cache = Cache::<Rasters>::new();
/// let client = cache.client();
///
/// let a = client.get((16, 16), &mut ());
/// let b = client.get((16, 16), &mut ());
/// assert!(framecache::entry::CacheRef::ptr_eq(&a, &b));
/// assert_eq!(cache.stats().misses, 1);
/// assert_eq!(cache.stats().hits, 1);
///
/// // Frame boundary: keep at most 64 bytes of rasters.
/// drop((a, b));
/// cache.trim(64);
/// ```
pub struct Cache<F: Family> {
    map: BucketMap<F>,
    queue: Mutex<EvictQueue<Arc<EntryInner<F>>>>,
    roster: Mutex<Vec<Arc<ClientShared<F>>>>,
    /// Promotion lists left behind by dropped clients, drained at trim.
    orphaned: Mutex<Vec<Arc<EntryInner<F>>>>,
    counters: CacheCounters,
    cur_frame: AtomicU64,
}

impl<F: Family> std::fmt::Debug for Cache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("cur_frame", &self.cur_frame.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<F: Family> Cache<F> {
    /// Creates a cache with [`DEFAULT_BUCKET_COUNT`] buckets.
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    /// Creates a cache with `bucket_count` buckets (a non-zero power of
    /// two, validated by [`CacheBuilder`](crate::builder::CacheBuilder)).
    pub(crate) fn with_bucket_count(bucket_count: usize) -> Self {
        Self {
            map: BucketMap::new(bucket_count),
            queue: Mutex::new(EvictQueue::new()),
            roster: Mutex::new(Vec::new()),
            orphaned: Mutex::new(Vec::new()),
            counters: CacheCounters::new(),
            cur_frame: AtomicU64::new(0),
        }
    }

    /// Registers a new client.
    ///
    /// Clients are cheap; give each rendering thread its own. Creation and
    /// disposal take the roster lock but do not block lookups by other
    /// clients.
    pub fn client(&self) -> CacheClient<'_, F> {
        let shared = Arc::new(ClientShared::new());
        self.roster.lock().push(Arc::clone(&shared));
        CacheClient::new(self, shared)
    }

    /// Looks `key` up on behalf of `client`. See
    /// [`CacheClient::get`](crate::client::CacheClient::get).
    pub(crate) fn lookup(
        &self,
        client: &Arc<ClientShared<F>>,
        key: F::Key,
        cx: &mut F::Context,
    ) -> CacheRef<F> {
        let hash = hash_key(&key);

        let mut chain = self.map.bucket(hash).lock();
        if let Some(entry) = chain
            .iter()
            .find(|e| e.hash == hash && e.key == key)
            .map(Arc::clone)
        {
            drop(chain);
            drop(key);
            self.counters.inc_hit();
            self.touch(client, &entry);
            if !entry.is_complete() {
                let creator = Arc::clone(&entry.creator);
                creator.wait_until_published(&entry);
            }
            return CacheRef::from_completed(entry);
        }

        // First writer: stage the pending entry while the bucket lock
        // still excludes competing inserts of an equal key.
        let frame = self.cur_frame.load(Ordering::Acquire);
        let entry = Arc::new(EntryInner::new_pending(
            hash,
            key,
            frame,
            Arc::clone(client),
        ));
        chain.push(Arc::clone(&entry));
        drop(chain);

        self.counters.inc_miss();
        self.counters.inc_items();
        client.promote.lock().push(Arc::clone(&entry));

        let built = F::construct(&entry.key, cx);
        entry.weight.store(built.weight, Ordering::Relaxed);
        self.counters.add_size(built.weight);
        if entry.value.set(built.value).is_err() {
            debug_assert!(false, "value constructed twice for one entry");
        }
        entry.creator.broadcast_published();

        CacheRef::from_completed(entry)
    }

    /// Marks `entry` as used in the current frame, queuing a promotion the
    /// first time per frame.
    fn touch(&self, client: &Arc<ClientShared<F>>, entry: &Arc<EntryInner<F>>) {
        let frame = self.cur_frame.load(Ordering::Acquire);
        if entry.last_used.swap(frame, Ordering::AcqRel) != frame {
            client.promote.lock().push(Arc::clone(entry));
        }
    }

    /// Ends the frame: promotes this frame's touches, evicts down to
    /// `max_size` bytes, and advances the frame counter.
    ///
    /// Eviction walks the queue oldest-first and stops at the first entry
    /// touched (or created) in the ending frame; everything behind it is
    /// at least as recent. Evicted entries lose the cache's references;
    /// handles held elsewhere keep them alive. Pending entries are never
    /// evicted.
    ///
    /// Intended to be called by a single coordinator at frame boundaries;
    /// concurrent calls are serialized on the queue lock.
    pub fn trim(&self, max_size: usize) {
        let mut queue = self.queue.lock();
        self.promote_touched(&mut queue);

        let frame = self.cur_frame.load(Ordering::Acquire);
        while self.counters.size() > max_size {
            let evictable = match queue.front() {
                Some(head) => {
                    head.last_used.load(Ordering::Relaxed) != frame && head.is_complete()
                }
                None => false,
            };
            if !evictable {
                break;
            }
            if let Some(entry) = queue.pop_front() {
                entry.queue_slot.store(NO_SLOT, Ordering::Relaxed);
                self.map.remove(&entry);
                self.counters.sub_size(entry.weight.load(Ordering::Relaxed));
                self.counters.dec_items();
                self.counters.inc_evictions();
            }
        }

        self.cur_frame.fetch_add(1, Ordering::AcqRel);
    }

    /// Forgets every entry: clears the queue, every bucket chain, and the
    /// usage gauges. Handles held elsewhere keep their entries alive.
    /// Idempotent. Like [`trim`](Cache::trim), a coordinator operation.
    pub fn empty(&self) {
        let mut queue = self.queue.lock();
        self.promote_touched(&mut queue);

        while let Some(entry) = queue.pop_front() {
            entry.queue_slot.store(NO_SLOT, Ordering::Relaxed);
        }
        self.map.clear();
        self.counters.reset_usage();
    }

    /// Drains every client's promotion list (and lists orphaned by dropped
    /// clients) into the queue tail, most recent last.
    fn promote_touched(&self, queue: &mut EvictQueue<Arc<EntryInner<F>>>) {
        let clients: Vec<_> = self.roster.lock().clone();
        let mut touched = mem::take(&mut *self.orphaned.lock());
        for client in &clients {
            let mut list = client.promote.lock();
            touched.append(&mut list);
        }

        for entry in touched {
            if entry.unlinked.load(Ordering::Acquire) {
                // Evicted (or emptied) after the touch; the map has let
                // go, so promotion would resurrect a dead entry.
                continue;
            }
            let slot = entry.queue_slot.load(Ordering::Relaxed);
            if slot != NO_SLOT {
                queue.unlink(SlotId::from_index(slot));
            }
            let id = queue.push_back(Arc::clone(&entry));
            entry.queue_slot.store(id.index(), Ordering::Relaxed);
        }
    }

    /// Unregisters a client, folding its pending touches back into the
    /// cache so they survive until the next trim.
    pub(crate) fn release_client(&self, shared: &Arc<ClientShared<F>>) {
        let mut leftovers = mem::take(&mut *shared.promote.lock());
        if !leftovers.is_empty() {
            self.orphaned.lock().append(&mut leftovers);
        }
        let mut roster = self.roster.lock();
        if let Some(pos) = roster.iter().position(|c| Arc::ptr_eq(c, shared)) {
            roster.swap_remove(pos);
        }
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// The current frame number. Advances by one at each [`trim`](Cache::trim).
    pub fn frame(&self) -> u64 {
        self.cur_frame.load(Ordering::Acquire)
    }

    /// Number of map buckets.
    pub fn bucket_count(&self) -> usize {
        self.map.bucket_count()
    }
}

impl<F: Family> Default for Cache<F> {
    fn default() -> Self {
        Self::new()
    }
}
