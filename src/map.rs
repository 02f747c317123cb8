//! Bucketed map: per-bucket locked chains keyed by a 64-bit key hash.
//!
//! ## Architecture
//!
//! ```text
//!   buckets: Box<[Mutex<Vec<Arc<EntryInner>>>]>      (power-of-two count)
//!
//!   hash(key) ──► bucket = hash & mask
//!                    │
//!                    ▼
//!   ┌───────────────────────────────────────────────┐
//!   │ Mutex<chain>                                  │
//!   │   [E_3] ─ [E_17] ─ [E_9]                      │
//!   │   scan: stored hash first, then full key eq   │
//!   └───────────────────────────────────────────────┘
//! ```
//!
//! Holding one bucket's lock across scan-then-insert makes insertion
//! linearizable per bucket: two clients racing on an equal key cannot both
//! miss, so each key has at most one live entry. A lock-free head splice
//! with rescan gives the same guarantee; the per-bucket lock gets it
//! without unsafe pointer chains.
//!
//! The map stores one strong reference per entry; `remove`/`clear` drop it
//! and mark the entry unlinked so late promotions ignore it.

use parking_lot::Mutex;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::entry::EntryInner;
use crate::family::Family;

/// Hashes a key with the cache's hasher.
#[inline]
pub(crate) fn hash_key<K: Hash>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

type Chain<F> = Vec<Arc<EntryInner<F>>>;

/// Fixed-size array of locked bucket chains.
pub(crate) struct BucketMap<F: Family> {
    buckets: Box<[Mutex<Chain<F>>]>,
    mask: u64,
}

impl<F: Family> BucketMap<F> {
    /// Creates a map with `bucket_count` buckets. `bucket_count` must be a
    /// non-zero power of two (validated by the builder).
    pub(crate) fn new(bucket_count: usize) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        let buckets: Box<[Mutex<Chain<F>>]> = (0..bucket_count)
            .map(|_| Mutex::new(Vec::new()))
            .collect();
        Self {
            buckets,
            mask: bucket_count as u64 - 1,
        }
    }

    /// Number of buckets.
    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The bucket responsible for `hash`.
    #[inline]
    pub(crate) fn bucket(&self, hash: u64) -> &Mutex<Chain<F>> {
        &self.buckets[(hash & self.mask) as usize]
    }

    /// Unlinks `entry` from its chain, dropping the map's reference.
    ///
    /// Returns `false` if the entry was not (or no longer) mapped.
    pub(crate) fn remove(&self, entry: &Arc<EntryInner<F>>) -> bool {
        let mut chain = self.bucket(entry.hash).lock();
        match chain.iter().position(|e| Arc::ptr_eq(e, entry)) {
            Some(pos) => {
                let removed = chain.swap_remove(pos);
                removed.unlinked.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Unlinks every entry, dropping the map's references.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn clear(&self) -> usize {
        let mut removed = 0;
        for bucket in self.buckets.iter() {
            let mut chain = bucket.lock();
            for entry in chain.drain(..) {
                entry.unlinked.store(true, Ordering::Release);
                removed += 1;
            }
        }
        removed
    }
}
