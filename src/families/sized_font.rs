//! Sized shaper-font cache keys.
//!
//! The shaper keeps one sized shaping face per (font, size) pair; this
//! family memoizes those so repeated runs at the same size reuse one face.
//! Keys pin the font entry they size.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entry::CacheRef;
use crate::family::Family;

use super::BitF64;

/// Key for the sized shaper-font cache.
pub struct SizedFontKey<FF: Family> {
    /// The font being sized (strong reference).
    pub font: CacheRef<FF>,
    /// Shaping size in layout units.
    pub size: BitF64,
}

impl<FF: Family> Hash for SizedFontKey<FF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font.hash(state);
        self.size.hash(state);
    }
}

impl<FF: Family> PartialEq for SizedFontKey<FF> {
    fn eq(&self, other: &Self) -> bool {
        self.font == other.font && self.size == other.size
    }
}

impl<FF: Family> Eq for SizedFontKey<FF> {}

impl<FF: Family> fmt::Debug for SizedFontKey<FF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizedFontKey")
            .field("font", &self.font)
            .field("size", &self.size)
            .finish()
    }
}
