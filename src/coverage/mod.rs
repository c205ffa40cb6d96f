//! Coverage oracle
//!
//! A code point inside a configured range says nothing about whether the
//! font actually draws it. The font's own character map is the ground truth:
//! a character is covered only if it maps to a glyph other than the
//! undefined-glyph sentinel.

use crate::engine::{FontEngine, GlyphLookup};
use crate::scan::charset::format_code_point;
use crate::scan::CharacterSet;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Partition of a character set relative to one font.
///
/// `covered` and `missing` are disjoint and together equal the input set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageResult {
    pub covered: CharacterSet,
    pub missing: CharacterSet,
}

impl CoverageResult {
    /// Split `chars` according to a glyph lookup.
    pub fn partition(lookup: &GlyphLookup, chars: &CharacterSet) -> Self {
        let mut result = CoverageResult::default();
        for &c in chars {
            if lookup.has_drawn_glyph(c) {
                result.covered.insert(c);
            } else {
                result.missing.insert(c);
            }
        }
        result
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check which of `chars` the font at `font` can render.
pub fn check_coverage<E: FontEngine>(
    engine: &E,
    font: &Path,
    chars: &CharacterSet,
) -> Result<CoverageResult> {
    let lookup = engine.lookup_glyphs(font, chars)?;
    Ok(CoverageResult::partition(&lookup, chars))
}

/// Log the coverage gap for `subject`, listing every missing character.
pub fn report_gaps(subject: &str, font: &Path, coverage: &CoverageResult) {
    if coverage.is_complete() {
        info!(
            "  ✓ {}: all {} characters have glyphs",
            subject,
            coverage.covered.len()
        );
        return;
    }

    let font_name = font
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| font.display().to_string());
    warn!(
        "  ⚠ {}: {} characters missing from {}: {}",
        subject,
        coverage.missing.len(),
        font_name,
        describe(&coverage.missing)
    );
}

/// `字 (U+5B57) 𠀀 (U+20000)` style listing for operator review.
pub fn describe(chars: &CharacterSet) -> String {
    chars
        .iter()
        .map(|&c| format!("{} ({})", c, format_code_point(u32::from(c))))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeEngine;
    use crate::engine::NOTDEF_GLYPH;

    #[test]
    fn test_partition_uses_sentinel_and_absence() {
        let mut lookup = GlyphLookup::new(NOTDEF_GLYPH);
        lookup.glyphs.insert('a', 1);
        lookup.glyphs.insert('b', NOTDEF_GLYPH);

        let chars = CharacterSet::from_text("abc");
        let result = CoverageResult::partition(&lookup, &chars);

        assert_eq!(result.covered, CharacterSet::from_text("a"));
        assert_eq!(result.missing, CharacterSet::from_text("bc"));
        assert!(!result.is_complete());
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let mut lookup = GlyphLookup::new(NOTDEF_GLYPH);
        for (gid, c) in "甲丙戊庚壬".chars().enumerate() {
            lookup.glyphs.insert(c, gid as u32 % 2);
        }

        let inputs = ["", "甲", "甲乙丙丁戊己庚辛壬癸", "xyz", "丙丙丙"];
        for input in inputs {
            let chars = CharacterSet::from_text(input);
            let result = CoverageResult::partition(&lookup, &chars);
            assert!(result.covered.is_disjoint(&result.missing), "input {input:?}");
            assert_eq!(result.covered.union(&result.missing), chars, "input {input:?}");
        }
    }

    #[test]
    fn test_check_coverage_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("Serif.otf");
        FakeEngine::write_font(&font, "漢字", "𠀀");

        let chars = CharacterSet::from_text("漢𠀀𠀁");
        let result = check_coverage(&FakeEngine::new(), &font, &chars).unwrap();

        assert_eq!(result.covered, CharacterSet::from_text("漢"));
        assert_eq!(result.missing, CharacterSet::from_text("𠀀𠀁"));
    }

    #[test]
    fn test_check_coverage_propagates_engine_errors() {
        let result = check_coverage(
            &FakeEngine::new(),
            Path::new("/nonexistent/font.otf"),
            &CharacterSet::from_text("a"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_lists_code_points() {
        let chars = CharacterSet::from_text("𠀀字");
        assert_eq!(describe(&chars), "字 (U+5B57) 𠀀 (U+20000)");
    }
}
