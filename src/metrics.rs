//! Cache activity counters and snapshots.
//!
//! Counters are relaxed atomics updated on the hot path; [`CacheStats`] is
//! the point-in-time view handed to callers by
//! [`Cache::stats`](crate::cache::Cache::stats). Hits, misses, and
//! evictions are cumulative since cache creation; `size` and `items` are
//! gauges of what the cache currently accounts for.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Snapshot of cache-level statistics.
///
/// # Example
///
/// ```
/// use framecache::metrics::CacheStats;
///
/// let stats = CacheStats {
///     size: 4096,
///     items: 3,
///     hits: 150,
///     misses: 50,
///     evictions: 12,
/// };
/// let hit_rate = stats.hits as f64 / (stats.hits + stats.misses) as f64;
/// assert!((hit_rate - 0.75).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total weight of accounted entries, in bytes.
    pub size: usize,
    /// Number of entries the cache currently tracks.
    pub items: u64,
    /// Lookups that found an existing entry.
    pub hits: u64,
    /// Lookups that constructed a new entry.
    pub misses: u64,
    /// Entries removed by `trim` to meet the size budget.
    pub evictions: u64,
}

/// Counter set backing [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    size: AtomicUsize,
    items: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            size: self.size.load(Ordering::Relaxed),
            items: self.items.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_items(&self) {
        self.items.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn dec_items(&self) {
        self.items.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_evictions(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_size(&self, weight: usize) {
        self.size.fetch_add(weight, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn sub_size(&self, weight: usize) {
        self.size.fetch_sub(weight, Ordering::Relaxed);
    }

    /// Zeroes the gauges after `empty`; cumulative counters keep counting.
    pub(crate) fn reset_usage(&self) {
        self.size.store(0, Ordering::Relaxed);
        self.items.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let counters = CacheCounters::new();
        counters.inc_hit();
        counters.inc_hit();
        counters.inc_miss();
        counters.inc_items();
        counters.add_size(100);
        counters.inc_evictions();

        let stats = counters.snapshot();
        assert_eq!(
            stats,
            CacheStats {
                size: 100,
                items: 1,
                hits: 2,
                misses: 1,
                evictions: 1,
            }
        );
    }

    #[test]
    fn reset_usage_keeps_cumulative_counters() {
        let counters = CacheCounters::new();
        counters.inc_miss();
        counters.add_size(64);
        counters.inc_items();

        counters.reset_usage();
        let stats = counters.snapshot();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.items, 0);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn size_add_sub_round_trips() {
        let counters = CacheCounters::new();
        counters.add_size(30);
        counters.add_size(12);
        counters.sub_size(30);
        assert_eq!(counters.size(), 12);
    }
}
