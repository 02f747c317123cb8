//! Key types for the renderer's cache families.
//!
//! One submodule per family. Producers pair these keys with their own value
//! and context types in a [`Family`](crate::family::Family) impl; the keys
//! encode the hashing, equality, and cross-cache ownership rules each
//! family needs.
//!
//! ## Cross-cache layering
//!
//! ```text
//!   composite ──► bitmap ──► outline ──► font
//!                              ▲  │
//!                              └──┘ (border outlines reference
//!                                    the outline they wrap)
//!   glyph metrics ──► font
//!   sized shaper font ──► font
//! ```
//!
//! Every arrow is a strong reference ([`CacheRef`](crate::entry::CacheRef))
//! owned by the key: holding a composite pins its bitmaps, which pin their
//! outlines, which pin their fonts. The graph is a strict DAG, references
//! only pointing down the strata, so plain strong counts suffice.
//!
//! ## Hashing and equality
//!
//! Cross-cache reference fields hash and compare by entry identity; scalar
//! fields by value. Float-valued fields use [`BitF64`], which hashes and
//! compares bit patterns.

pub mod bitmap;
pub mod composite;
pub mod font;
pub mod glyph_metrics;
pub mod outline;
pub mod sized_font;

use std::hash::{Hash, Hasher};

/// An `f64` key field, hashed and compared by bit pattern.
///
/// Key fields need `Hash + Eq`, which `f64` does not provide; bit-pattern
/// identity is the right notion for cache keys, where `0.0` and `-0.0` are
/// distinct inputs and `NaN` payloads never occur.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitF64(pub f64);

impl From<f64> for BitF64 {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl PartialEq for BitF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for BitF64 {}

impl Hash for BitF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.to_bits());
    }
}
