//! Bitmap cache keys.
//!
//! The bitmap cache memoizes rasterizations of cached outlines. A key pins
//! the outline entry it rasterizes (strong reference, compared by identity)
//! together with the quantized placement that shaped the raster.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entry::CacheRef;
use crate::family::Family;

/// Key for the bitmap cache: an outline plus its quantized transform.
///
/// The transform is pre-quantized by the producer so that nearby subpixel
/// placements share one raster; two keys are equal only if they rasterize
/// the same outline entry with the same quantized coefficients.
pub struct BitmapKey<OF: Family> {
    /// The outline being rasterized (strong reference).
    pub outline: CacheRef<OF>,
    /// Quantized x row of the transform matrix.
    pub matrix_x: [i32; 3],
    /// Quantized y row of the transform matrix.
    pub matrix_y: [i32; 3],
}

impl<OF: Family> Hash for BitmapKey<OF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.outline.hash(state);
        self.matrix_x.hash(state);
        self.matrix_y.hash(state);
    }
}

impl<OF: Family> PartialEq for BitmapKey<OF> {
    fn eq(&self, other: &Self) -> bool {
        self.outline == other.outline
            && self.matrix_x == other.matrix_x
            && self.matrix_y == other.matrix_y
    }
}

impl<OF: Family> Eq for BitmapKey<OF> {}

impl<OF: Family> fmt::Debug for BitmapKey<OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapKey")
            .field("outline", &self.outline)
            .field("matrix_x", &self.matrix_x)
            .field("matrix_y", &self.matrix_y)
            .finish()
    }
}
