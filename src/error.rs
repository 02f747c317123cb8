//! Error types for the framecache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. a zero or non-power-of-two bucket count).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use framecache::builder::CacheBuilder;
//! use framecache::error::ConfigError;
//! use framecache::family::{Constructed, Family};
//!
//! struct Widgets;
//! impl Family for Widgets {
//!     type Key = u64;
//!     type Value = u64;
//!     type Context = ();
//!     fn construct(key: &u64, _cx: &mut ()) -> Constructed<u64> {
//!         Constructed::new(*key, 8)
//!     }
//! }
//!
//! // Fallible constructor for user-configurable parameters
//! let cache = CacheBuilder::new().bucket_count(256).try_build::<Widgets>();
//! assert!(cache.is_ok());
//!
//! // Invalid bucket count is caught without panicking
//! let bad: Result<_, ConfigError> = CacheBuilder::new().bucket_count(100).try_build::<Widgets>();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by debug-only `check_invariants` methods on internal structures
/// (e.g. the eviction queue). Carries a human-readable description of which
/// invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
