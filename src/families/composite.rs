//! Composite cache keys.
//!
//! The composite cache memoizes filtered combinations of already-rasterized
//! bitmaps (blur, bevel, shadow passes over a run of glyphs). Its key is a
//! filter description plus the ordered list of source bitmap entries; the
//! list allocation is owned by the key, and every listed entry is pinned by
//! a strong reference.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entry::CacheRef;
use crate::family::Family;

/// The filter applied when combining source bitmaps.
///
/// All fields are pre-quantized integers, so derived hashing and equality
/// apply directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterDesc {
    /// Effect flags (border style, shadow enable, …).
    pub flags: u32,
    /// Box-blur passes.
    pub be: i32,
    /// Quantized gaussian blur radius.
    pub blur: i32,
    /// Quantized shadow offset, x.
    pub shadow_x: i32,
    /// Quantized shadow offset, y.
    pub shadow_y: i32,
}

/// One source of a composite: a glyph's fill raster and, when the style
/// has a border, the border raster.
pub struct BitmapRef<BF: Family> {
    /// Fill bitmap (strong reference).
    pub image: CacheRef<BF>,
    /// Border bitmap, absent for borderless styles (strong reference).
    pub border_image: Option<CacheRef<BF>>,
}

impl<BF: Family> Hash for BitmapRef<BF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.image.hash(state);
        self.border_image.hash(state);
    }
}

impl<BF: Family> PartialEq for BitmapRef<BF> {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image && self.border_image == other.border_image
    }
}

impl<BF: Family> Eq for BitmapRef<BF> {}

impl<BF: Family> fmt::Debug for BitmapRef<BF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapRef")
            .field("image", &self.image)
            .field("border_image", &self.border_image)
            .finish()
    }
}

/// Key for the composite cache: filter plus source list.
///
/// Equality requires the same filter, the same length, and pairwise
/// identity of every source entry, in order.
pub struct CompositeKey<BF: Family> {
    /// The filter to apply.
    pub filter: FilterDesc,
    /// Source bitmaps, in composition order. Owned by the key.
    pub bitmaps: Box<[BitmapRef<BF>]>,
}

impl<BF: Family> Hash for CompositeKey<BF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.filter.hash(state);
        self.bitmaps.len().hash(state);
        for bitmap in self.bitmaps.iter() {
            bitmap.hash(state);
        }
    }
}

impl<BF: Family> PartialEq for CompositeKey<BF> {
    fn eq(&self, other: &Self) -> bool {
        self.filter == other.filter && self.bitmaps == other.bitmaps
    }
}

impl<BF: Family> Eq for CompositeKey<BF> {}

impl<BF: Family> fmt::Debug for CompositeKey<BF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeKey")
            .field("filter", &self.filter)
            .field("bitmaps", &self.bitmaps)
            .finish()
    }
}
