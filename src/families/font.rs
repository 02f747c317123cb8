//! Font cache keys.
//!
//! The font cache memoizes parsed font objects by the style request that
//! selected them. The key owns its family-name string; no cross-cache
//! references; fonts are the bottom of the DAG.

/// Key for the font cache: a style request.
///
/// The family name is owned by the key (and thus by the entry once the key
/// is adopted); dropping the entry frees it.
///
/// # Example
///
/// ```
/// use framecache::families::font::FontKey;
///
/// let a = FontKey::new("Noto Sans", 700, true);
/// let b = FontKey::new("Noto Sans", 700, true);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Requested family name.
    pub family: Box<str>,
    /// Requested weight (CSS-style, 100–900).
    pub weight: u32,
    /// Requested italic.
    pub italic: bool,
    /// Vertical layout variant.
    pub vertical: bool,
}

impl FontKey {
    /// Convenience constructor for a horizontal-layout request.
    pub fn new(family: &str, weight: u32, italic: bool) -> Self {
        Self {
            family: family.into(),
            weight,
            italic,
            vertical: false,
        }
    }
}
