// ==============================================
// CACHE INVARIANT TESTS (integration)
// ==============================================
//
// Single-threaded, observable-behavior tests: stats accounting, eviction
// order, frame pinning, cross-cache reference DAGs, and destruction order.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use framecache::cache::Cache;
use framecache::entry::CacheRef;
use framecache::family::{Constructed, Family};

// ==============================================
// Stats and eviction accounting
// ==============================================
//
// Keys carry (id, weight); the constructor counts its invocations so the
// tests can pin down exactly-once construction.

mod accounting {
    use super::*;

    struct Blobs;

    impl Family for Blobs {
        type Key = (u64, usize);
        type Value = u64;
        type Context = AtomicU32;

        fn construct(key: &(u64, usize), calls: &mut AtomicU32) -> Constructed<u64> {
            calls.fetch_add(1, Ordering::Relaxed);
            Constructed::new(key.0, key.1)
        }
    }

    #[test]
    fn stats_track_inserts_hits_and_sizes() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);

        let k1 = client.get((1, 10), &mut calls);
        let k2 = client.get((2, 20), &mut calls);
        let k3 = client.get((3, 30), &mut calls);

        let stats = cache.stats();
        assert_eq!(stats.size, 60);
        assert_eq!(stats.items, 3);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 3);

        let k2_again = client.get((2, 20), &mut calls);
        assert!(CacheRef::ptr_eq(&k2, &k2_again));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 3);
        assert_eq!(calls.load(Ordering::Relaxed), 3);

        drop((k1, k3));
    }

    #[test]
    fn trim_evicts_oldest_until_budget_met() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);

        client.get((1, 10), &mut calls);
        client.get((2, 20), &mut calls);
        client.get((3, 30), &mut calls);

        cache.trim(usize::MAX); // frame boundary, nothing over budget
        cache.trim(30);

        let stats = cache.stats();
        assert_eq!(stats.size, 30);
        assert_eq!(stats.items, 1);
        assert_eq!(stats.evictions, 2);

        // K1 and K2 are gone; K3 survived.
        client.get((3, 30), &mut calls);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
        client.get((1, 10), &mut calls);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn touches_pin_entries_for_the_frame() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);

        client.get((1, 10), &mut calls);
        client.get((2, 20), &mut calls);
        client.get((3, 30), &mut calls);
        cache.trim(usize::MAX);

        let frame = cache.frame();
        client.get((1, 10), &mut calls);
        client.get((2, 20), &mut calls);
        cache.trim(0);

        let stats = cache.stats();
        assert_eq!(stats.items, 2);
        assert_eq!(stats.size, 30);
        assert_eq!(cache.frame(), frame + 1);
    }

    #[test]
    fn trim_monotonicity() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);

        for i in 0..64u64 {
            client.get((i, (i as usize % 7) + 1), &mut calls);
        }
        cache.trim(usize::MAX);

        for budget in [usize::MAX, 100, 37, 8, 0] {
            cache.trim(budget);
            let stats = cache.stats();
            // Nothing was touched after the first boundary, so the budget
            // must be met exactly (no pinned stragglers).
            assert!(
                stats.size <= budget,
                "size {} exceeds budget {}",
                stats.size,
                budget
            );
        }
        assert_eq!(cache.stats().items, 0);
    }

    #[test]
    fn empty_twice_leaves_nothing() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);

        client.get((1, 10), &mut calls);
        client.get((2, 20), &mut calls);

        cache.empty();
        cache.empty();

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.items, 0);
    }

    #[test]
    fn key_round_trip() {
        let cache = Cache::<Blobs>::new();
        let client = cache.client();
        let mut calls = AtomicU32::new(0);
        let r = client.get((77, 5), &mut calls);
        assert_eq!(*r.key(), (77, 5));
    }
}

// ==============================================
// Cross-cache reference DAG
// ==============================================
//
// An outline cache and a bitmap cache whose keys pin outline entries.
// Values log their drop order so the tests can verify that releasing an
// owner strictly precedes releasing its sub-entries.

mod cross_cache {
    use super::*;
    use framecache::families::bitmap::BitmapKey;

    type DropLog = Arc<Mutex<Vec<&'static str>>>;

    /// Logs its label when dropped.
    struct Tracked {
        label: &'static str,
        log: DropLog,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    struct Outlines;

    impl Family for Outlines {
        type Key = u32;
        type Value = Tracked;
        type Context = (DropLog, &'static str);

        fn construct(_key: &u32, cx: &mut (DropLog, &'static str)) -> Constructed<Tracked> {
            Constructed::new(
                Tracked {
                    label: cx.1,
                    log: Arc::clone(&cx.0),
                },
                10,
            )
        }
    }

    struct Bitmaps;

    impl Family for Bitmaps {
        type Key = BitmapKey<Outlines>;
        type Value = Tracked;
        type Context = (DropLog, &'static str);

        fn construct(
            _key: &BitmapKey<Outlines>,
            cx: &mut (DropLog, &'static str),
        ) -> Constructed<Tracked> {
            Constructed::new(
                Tracked {
                    label: cx.1,
                    log: Arc::clone(&cx.0),
                },
                100,
            )
        }
    }

    fn bitmap_key(outline: CacheRef<Outlines>) -> BitmapKey<Outlines> {
        BitmapKey {
            outline,
            matrix_x: [1 << 16, 0, 0],
            matrix_y: [0, 1 << 16, 0],
        }
    }

    #[test]
    fn bitmap_key_pins_its_outline() {
        let log: DropLog = Arc::new(Mutex::new(Vec::new()));
        let outlines = Cache::<Outlines>::new();
        let bitmaps = Cache::<Bitmaps>::new();

        let o_client = outlines.client();
        let b_client = bitmaps.client();

        let outline = o_client.get(1, &mut (Arc::clone(&log), "outline"));
        let bitmap = b_client.get(bitmap_key(outline.clone()), &mut (Arc::clone(&log), "bitmap"));
        drop(outline);

        // Evict the outline from its own cache; the bitmap key still pins it.
        outlines.trim(usize::MAX);
        outlines.trim(0);
        assert_eq!(outlines.stats().items, 0);
        assert!(log.lock().unwrap().is_empty());

        // The bitmap key can still reach the live outline entry.
        assert_eq!(bitmap.key().outline.value().label, "outline");
    }

    #[test]
    fn owner_destruction_precedes_sub_entry_destruction() {
        let log: DropLog = Arc::new(Mutex::new(Vec::new()));
        let outlines = Cache::<Outlines>::new();
        let bitmaps = Cache::<Bitmaps>::new();

        {
            let o_client = outlines.client();
            let b_client = bitmaps.client();
            let outline = o_client.get(1, &mut (Arc::clone(&log), "outline"));
            let _bitmap =
                b_client.get(bitmap_key(outline), &mut (Arc::clone(&log), "bitmap"));
        }

        // Drop every cache-held reference in both caches. The bitmap entry
        // dies with the caches; its key's outline reference goes with it,
        // which in turn frees the outline entry.
        bitmaps.empty();
        outlines.empty();

        assert_eq!(*log.lock().unwrap(), vec!["bitmap", "outline"]);
    }

    #[test]
    fn equal_sub_references_hit_the_same_composite_entry() {
        let log: DropLog = Arc::new(Mutex::new(Vec::new()));
        let outlines = Cache::<Outlines>::new();
        let bitmaps = Cache::<Bitmaps>::new();

        let o_client = outlines.client();
        let b_client = bitmaps.client();

        let outline = o_client.get(1, &mut (Arc::clone(&log), "outline"));
        let first = b_client.get(bitmap_key(outline.clone()), &mut (Arc::clone(&log), "bitmap"));
        let second = b_client.get(bitmap_key(outline), &mut (Arc::clone(&log), "bitmap"));

        assert!(CacheRef::ptr_eq(&first, &second));
        assert_eq!(bitmaps.stats().misses, 1);
        assert_eq!(bitmaps.stats().hits, 1);
    }
}

// ==============================================
// External holders vs. the cache
// ==============================================

mod external_holders {
    use super::*;

    struct Counted;

    static LIVE: AtomicU32 = AtomicU32::new(0);

    struct LiveValue;

    impl Drop for LiveValue {
        fn drop(&mut self) {
            LIVE.fetch_sub(1, Ordering::Relaxed);
        }
    }

    impl Family for Counted {
        type Key = u32;
        type Value = LiveValue;
        type Context = ();

        fn construct(_key: &u32, _cx: &mut ()) -> Constructed<LiveValue> {
            LIVE.fetch_add(1, Ordering::Relaxed);
            Constructed::new(LiveValue, 1)
        }
    }

    #[test]
    fn handles_keep_evicted_entries_alive() {
        let cache = Cache::<Counted>::new();
        let client = cache.client();

        let held = client.get(1, &mut ());
        cache.trim(usize::MAX);
        cache.trim(0);
        assert_eq!(cache.stats().items, 0);
        assert_eq!(LIVE.load(Ordering::Relaxed), 1);

        drop(held);
        assert_eq!(LIVE.load(Ordering::Relaxed), 0);

        // Re-fetching constructs a fresh value.
        let again = client.get(1, &mut ());
        assert_eq!(LIVE.load(Ordering::Relaxed), 1);
        drop(again);
        cache.empty();
        assert_eq!(LIVE.load(Ordering::Relaxed), 0);
    }
}
