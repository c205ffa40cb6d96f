//! Font engine boundary
//!
//! Parsing font binaries and producing subsets is delegated to a
//! `FontEngine`. The pipeline only ever talks to this trait, so tests can
//! drive it with an in-memory fake instead of real font files.

pub mod pyftsubset;
#[cfg(test)]
pub(crate) mod testing;

pub use pyftsubset::PyftsubsetEngine;

use crate::config::LayoutPolicy;
use crate::scan::CharacterSet;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Glyph identifier of the conventional undefined glyph.
pub const NOTDEF_GLYPH: u32 = 0;

/// What a font's character map says about a set of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphLookup {
    /// The first glyph in the font's glyph order, standing for "no glyph"
    pub notdef: u32,
    /// Glyph each requested character maps to; unmapped characters are absent
    pub glyphs: BTreeMap<char, u32>,
}

impl GlyphLookup {
    pub fn new(notdef: u32) -> Self {
        Self {
            notdef,
            glyphs: BTreeMap::new(),
        }
    }

    pub fn glyph(&self, c: char) -> Option<u32> {
        self.glyphs.get(&c).copied()
    }

    /// True if `c` maps to a real glyph rather than nothing or the sentinel.
    pub fn has_drawn_glyph(&self, c: char) -> bool {
        matches!(self.glyph(c), Some(gid) if gid != self.notdef)
    }
}

/// Everything the engine needs to produce one artifact.
#[derive(Debug, Clone, Copy)]
pub struct SubsetRequest<'a> {
    pub source: &'a Path,
    pub chars: &'a CharacterSet,
    pub layout: &'a LayoutPolicy,
    /// Where the WOFF2 output goes; existing contents are replaced
    pub output: &'a Path,
}

/// The font introspection and subsetting capability.
#[allow(async_fn_in_trait)]
pub trait FontEngine {
    /// Resolve `chars` through the best character map of the font at `font`.
    fn lookup_glyphs(&self, font: &Path, chars: &CharacterSet) -> Result<GlyphLookup>;

    /// Write a WOFF2 font holding only the glyphs for `request.chars`.
    ///
    /// Must never modify `request.source`.
    async fn write_subset(&self, request: &SubsetRequest<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_drawn_glyph() {
        let mut lookup = GlyphLookup::new(NOTDEF_GLYPH);
        lookup.glyphs.insert('a', 5);
        lookup.glyphs.insert('b', NOTDEF_GLYPH);

        assert!(lookup.has_drawn_glyph('a'));
        assert!(!lookup.has_drawn_glyph('b'));
        assert!(!lookup.has_drawn_glyph('c'));
    }

    #[test]
    fn test_sentinel_follows_glyph_order() {
        let mut lookup = GlyphLookup::new(3);
        lookup.glyphs.insert('a', 0);
        lookup.glyphs.insert('b', 3);
        assert!(lookup.has_drawn_glyph('a'));
        assert!(!lookup.has_drawn_glyph('b'));
    }
}
