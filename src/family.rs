//! # Cache Family Descriptors
//!
//! Each kind of cached render product (parsed font, glyph outline, glyph
//! metrics, rasterized bitmap, composite raster, sized shaper font) is one
//! *family*. A family fixes the key type, the value type, and the constructor
//! that materializes a value from a key. One [`Cache`](crate::cache::Cache)
//! instance serves exactly one family.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        Family (descriptor)                       │
//!   │                                                                  │
//!   │   type Key: Hash + Eq      hashing + equality of lookups         │
//!   │   type Value               the memoized render product           │
//!   │   type Context             producer state passed to construct    │
//!   │                                                                  │
//!   │   construct(key, cx) ──► Constructed { value, weight }           │
//!   │                           called exactly once per entry,         │
//!   │                           outside all cache locks                │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Model
//!
//! The C-style descriptor callbacks collapse into Rust ownership:
//!
//! | Callback            | Rust realization                                |
//! |---------------------|-------------------------------------------------|
//! | hash / compare      | `Key: Hash + Eq`                                |
//! | key adoption        | `get` takes the key by value (a move)           |
//! | key destructor      | `Drop for Key` (releases cross-cache refs)      |
//! | value constructor   | [`Family::construct`]                           |
//! | value destructor    | `Drop for Value`                                |
//!
//! Keys whose fields reference entries of *other* caches hold
//! [`CacheRef`](crate::entry::CacheRef)s; dropping the key releases those
//! strong references, so the cross-cache DAG needs no manual bookkeeping.
//!
//! ## Weight
//!
//! `construct` reports the value's weight in bytes; the cache sums weights
//! into its size budget for [`trim`](crate::cache::Cache::trim). A weight of
//! zero is legal and contributes nothing to the budget; use it for families
//! whose values are too small to meter. Completion state is tracked
//! separately from the weight, so no sentinel values are reserved.
//!
//! ## Constructor Contract
//!
//! - `construct` is invoked at most once per entry, by the client that won
//!   the insertion race, with no cache lock held.
//! - It must not call back into the same cache with the same key (the
//!   calling client would wait on its own completion signal).
//! - It must not fail or panic; producers that can fail semantically encode
//!   the failure inside the value (e.g. an empty bitmap).

use std::hash::Hash;

/// Descriptor for one cache family.
///
/// Implemented by producers on a marker type per family; the implementation
/// names the key/value/context types and supplies the constructor. See the
/// [module docs](self) for the full contract.
///
/// # Example
///
/// ```
/// use framecache::cache::Cache;
/// use framecache::family::{Constructed, Family};
///
/// /// Shaped text runs keyed by (font id, text).
/// struct ShapedRuns;
///
/// impl Family for ShapedRuns {
///     type Key = (u32, String);
///     type Value = Vec<u16>;
///     type Context = ();
///
///     fn construct(key: &Self::Key, _cx: &mut ()) -> Constructed<Vec<u16>> {
///         let glyphs: Vec<u16> = key.1.chars().map(|c| c as u16).collect();
///         let weight = glyphs.len() * 2;
///         Constructed::new(glyphs, weight)
///     }
/// }
///
/// let cache = Cache::<ShapedRuns>::new();
/// let client = cache.client();
/// let run = client.get((7, "fin".to_string()), &mut ());
/// assert_eq!(run.value().len(), 3);
/// ```
pub trait Family: 'static {
    /// Lookup key. Hashing and equality of fields that reference other
    /// caches' entries go by entry identity
    /// ([`CacheRef`](crate::entry::CacheRef) implements both that way).
    type Key: Hash + Eq + Send + Sync + 'static;

    /// The memoized value.
    type Value: Send + Sync + 'static;

    /// Producer state threaded through [`get`](crate::client::CacheClient::get)
    /// into the constructor (font providers, rasterizer scratch buffers, …).
    type Context: ?Sized;

    /// Materializes the value for `key`. Called exactly once per entry,
    /// outside all cache locks. See the module docs for the contract.
    fn construct(key: &Self::Key, cx: &mut Self::Context) -> Constructed<Self::Value>;
}

/// A constructed value paired with its weight in bytes.
///
/// Returned by [`Family::construct`]; the weight feeds the cache's size
/// budget. See the [module docs](self) on zero weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constructed<V> {
    /// The materialized value.
    pub value: V,
    /// Size of the value in bytes, as counted against the trim budget.
    pub weight: usize,
}

impl<V> Constructed<V> {
    /// Pairs a value with its weight in bytes.
    #[inline]
    pub fn new(value: V, weight: usize) -> Self {
        Self { value, weight }
    }

    /// A value that contributes nothing to the size budget.
    #[inline]
    pub fn weightless(value: V) -> Self {
        Self { value, weight: 0 }
    }
}
