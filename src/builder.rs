//! Builder for configuring caches.
//!
//! [`Cache::new`](crate::cache::Cache::new) covers the common case; the
//! builder exists for tuning the bucket count when a family's working set
//! is far from the default.
//!
//! ## Example
//!
//! ```
//! use framecache::builder::CacheBuilder;
//! use framecache::family::{Constructed, Family};
//!
//! struct Metrics;
//! impl Family for Metrics {
//!     type Key = u64;
//!     type Value = [i32; 4];
//!     type Context = ();
//!     fn construct(_key: &u64, _cx: &mut ()) -> Constructed<[i32; 4]> {
//!         Constructed::weightless([0; 4])
//!     }
//! }
//!
//! // A small family gets a small table.
//! let cache = CacheBuilder::new()
//!     .bucket_count(256)
//!     .try_build::<Metrics>()
//!     .unwrap();
//! assert_eq!(cache.bucket_count(), 256);
//! ```

use crate::cache::{Cache, DEFAULT_BUCKET_COUNT};
use crate::error::ConfigError;
use crate::family::Family;

/// Largest accepted bucket count.
const MAX_BUCKET_COUNT: usize = 1 << 24;

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    bucket_count: usize,
}

impl CacheBuilder {
    /// Starts from the defaults ([`DEFAULT_BUCKET_COUNT`] buckets).
    pub fn new() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }

    /// Sets the map bucket count. Must be a power of two in
    /// `1..=16_777_216`; validated by [`try_build`](CacheBuilder::try_build).
    pub fn bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Builds a cache for family `F`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the bucket count is zero, not a power of
    /// two, or above the maximum.
    pub fn try_build<F: Family>(self) -> Result<Cache<F>, ConfigError> {
        if self.bucket_count == 0 {
            return Err(ConfigError::new("bucket_count must be non-zero"));
        }
        if !self.bucket_count.is_power_of_two() {
            return Err(ConfigError::new("bucket_count must be a power of two"));
        }
        if self.bucket_count > MAX_BUCKET_COUNT {
            return Err(ConfigError::new(format!(
                "bucket_count must be at most {}",
                MAX_BUCKET_COUNT
            )));
        }
        Ok(Cache::with_bucket_count(self.bucket_count))
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Constructed;

    struct Units;

    impl Family for Units {
        type Key = u8;
        type Value = u8;
        type Context = ();

        fn construct(key: &u8, _cx: &mut ()) -> Constructed<u8> {
            Constructed::weightless(*key)
        }
    }

    #[test]
    fn defaults_build() {
        let cache = CacheBuilder::new().try_build::<Units>().unwrap();
        assert_eq!(cache.bucket_count(), DEFAULT_BUCKET_COUNT);
    }

    #[test]
    fn custom_bucket_count() {
        let cache = CacheBuilder::new()
            .bucket_count(64)
            .try_build::<Units>()
            .unwrap();
        assert_eq!(cache.bucket_count(), 64);
    }

    #[test]
    fn zero_bucket_count_rejected() {
        let err = CacheBuilder::new()
            .bucket_count(0)
            .try_build::<Units>()
            .unwrap_err();
        assert!(err.message().contains("non-zero"));
    }

    #[test]
    fn non_power_of_two_rejected() {
        let err = CacheBuilder::new()
            .bucket_count(1000)
            .try_build::<Units>()
            .unwrap_err();
        assert!(err.message().contains("power of two"));
    }

    #[test]
    fn oversized_bucket_count_rejected() {
        let err = CacheBuilder::new()
            .bucket_count(1 << 25)
            .try_build::<Units>()
            .unwrap_err();
        assert!(err.message().contains("at most"));
    }
}
