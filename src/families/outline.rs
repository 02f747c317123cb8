//! Outline cache keys.
//!
//! The outline cache memoizes vector outlines from four sources, so its key
//! is a tagged variant; hashing and equality dispatch on the tag:
//!
//! | Variant   | Source                       | Owns                        |
//! |-----------|------------------------------|-----------------------------|
//! | `Glyph`   | a font glyph                 | strong font reference       |
//! | `Drawing` | inline vector drawing text   | the drawing source string   |
//! | `Border`  | stroking another outline     | strong outline reference    |
//! | `Box`     | the opaque-box border shape  | nothing                     |
//!
//! `FF` is the font family, `OF` the outline family itself: border keys
//! reference sibling entries of their own cache.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use crate::entry::CacheRef;
use crate::family::Family;

use super::BitF64;

/// Key for the outline cache.
pub enum OutlineKey<FF: Family, OF: Family> {
    /// Outline of one font glyph.
    Glyph(GlyphKey<FF>),
    /// Outline parsed from an inline drawing.
    Drawing(DrawingKey),
    /// Stroked border of another cached outline.
    Border(BorderKey<OF>),
    /// The opaque-box border shape; one per cache.
    Box,
}

impl<FF: Family, OF: Family> Hash for OutlineKey<FF, OF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            OutlineKey::Glyph(k) => k.hash(state),
            OutlineKey::Drawing(k) => k.hash(state),
            OutlineKey::Border(k) => k.hash(state),
            OutlineKey::Box => {}
        }
    }
}

impl<FF: Family, OF: Family> PartialEq for OutlineKey<FF, OF> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OutlineKey::Glyph(a), OutlineKey::Glyph(b)) => a == b,
            (OutlineKey::Drawing(a), OutlineKey::Drawing(b)) => a == b,
            (OutlineKey::Border(a), OutlineKey::Border(b)) => a == b,
            (OutlineKey::Box, OutlineKey::Box) => true,
            _ => false,
        }
    }
}

impl<FF: Family, OF: Family> Eq for OutlineKey<FF, OF> {}

// Manual impl: deriving would bound the family parameters themselves.
impl<FF: Family, OF: Family> fmt::Debug for OutlineKey<FF, OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineKey::Glyph(k) => f.debug_tuple("Glyph").field(k).finish(),
            OutlineKey::Drawing(k) => f.debug_tuple("Drawing").field(k).finish(),
            OutlineKey::Border(k) => f.debug_tuple("Border").field(k).finish(),
            OutlineKey::Box => f.write_str("Box"),
        }
    }
}

/// A glyph outline request: which glyph of which font, at what scale.
///
/// The font reference is compared by entry identity; the scalars by value.
pub struct GlyphKey<FF: Family> {
    /// The parsed font the glyph comes from (strong reference).
    pub font: CacheRef<FF>,
    /// Face index within the font file.
    pub face_index: i32,
    /// Glyph index within the face.
    pub glyph_index: u32,
    /// Font size in layout units.
    pub size: BitF64,
    /// Synthetic emboldening amount.
    pub bold: u32,
    /// Synthetic slant flag.
    pub italic: bool,
    /// Horizontal scale factor.
    pub scale_x: BitF64,
    /// Vertical scale factor.
    pub scale_y: BitF64,
}

impl<FF: Family> Hash for GlyphKey<FF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font.hash(state);
        self.face_index.hash(state);
        self.glyph_index.hash(state);
        self.size.hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.scale_x.hash(state);
        self.scale_y.hash(state);
    }
}

impl<FF: Family> PartialEq for GlyphKey<FF> {
    fn eq(&self, other: &Self) -> bool {
        self.font == other.font
            && self.face_index == other.face_index
            && self.glyph_index == other.glyph_index
            && self.size == other.size
            && self.bold == other.bold
            && self.italic == other.italic
            && self.scale_x == other.scale_x
            && self.scale_y == other.scale_y
    }
}

impl<FF: Family> Eq for GlyphKey<FF> {}

impl<FF: Family> fmt::Debug for GlyphKey<FF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphKey")
            .field("font", &self.font)
            .field("face_index", &self.face_index)
            .field("glyph_index", &self.glyph_index)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A drawing outline request: the drawing's source text, owned by the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawingKey {
    /// Drawing command text.
    pub text: Box<str>,
}

impl DrawingKey {
    /// Wraps drawing source text.
    pub fn new(text: &str) -> Self {
        Self { text: text.into() }
    }
}

/// A border outline request: which outline to stroke, and how thick.
///
/// The outline reference is compared by entry identity.
pub struct BorderKey<OF: Family> {
    /// The outline being stroked (strong reference into the same cache).
    pub outline: CacheRef<OF>,
    /// Horizontal border thickness.
    pub border_x: BitF64,
    /// Vertical border thickness.
    pub border_y: BitF64,
}

impl<OF: Family> Hash for BorderKey<OF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.outline.hash(state);
        self.border_x.hash(state);
        self.border_y.hash(state);
    }
}

impl<OF: Family> PartialEq for BorderKey<OF> {
    fn eq(&self, other: &Self) -> bool {
        self.outline == other.outline
            && self.border_x == other.border_x
            && self.border_y == other.border_y
    }
}

impl<OF: Family> Eq for BorderKey<OF> {}

impl<OF: Family> fmt::Debug for BorderKey<OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BorderKey")
            .field("outline", &self.outline)
            .field("border_x", &self.border_x)
            .field("border_y", &self.border_y)
            .finish()
    }
}
