//! Glyph-metrics cache keys.
//!
//! Memoizes per-glyph metrics (advance, bearing, bounding box) so layout
//! can run without re-measuring glyphs every frame. Keys pin the font
//! entry the metrics were measured from.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entry::CacheRef;
use crate::family::Family;

use super::BitF64;

/// Key for the glyph-metrics cache.
pub struct GlyphMetricsKey<FF: Family> {
    /// The measured font (strong reference).
    pub font: CacheRef<FF>,
    /// Face index within the font file.
    pub face_index: i32,
    /// Glyph index within the face.
    pub glyph_index: u32,
    /// Font size the metrics were taken at.
    pub size: BitF64,
}

impl<FF: Family> Hash for GlyphMetricsKey<FF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font.hash(state);
        self.face_index.hash(state);
        self.glyph_index.hash(state);
        self.size.hash(state);
    }
}

impl<FF: Family> PartialEq for GlyphMetricsKey<FF> {
    fn eq(&self, other: &Self) -> bool {
        self.font == other.font
            && self.face_index == other.face_index
            && self.glyph_index == other.glyph_index
            && self.size == other.size
    }
}

impl<FF: Family> Eq for GlyphMetricsKey<FF> {}

impl<FF: Family> fmt::Debug for GlyphMetricsKey<FF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphMetricsKey")
            .field("font", &self.font)
            .field("face_index", &self.face_index)
            .field("glyph_index", &self.glyph_index)
            .field("size", &self.size)
            .finish()
    }
}
