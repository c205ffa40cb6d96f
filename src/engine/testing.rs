//! In-memory font engine for tests
//!
//! A fake font is a UTF-8 text file. Characters before an optional `|` have
//! drawn glyphs; characters after it are mapped to the undefined glyph.
//! Subsets are plain text files recording the source name and characters,
//! so identical inputs always produce identical bytes.

use super::{FontEngine, GlyphLookup, SubsetRequest, NOTDEF_GLYPH};
use crate::scan::CharacterSet;
use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const FAKE_MAGIC: &str = "FAKE-WOFF2";

#[derive(Default)]
pub struct FakeEngine {
    failing: HashSet<PathBuf>,
    subsets: RefCell<Vec<(PathBuf, CharacterSet)>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `write_subset` fail for this source font.
    pub fn failing_on(mut self, source: impl Into<PathBuf>) -> Self {
        self.failing.insert(source.into());
        self
    }

    /// Every subset requested so far, as (source, characters).
    pub fn subsets(&self) -> Vec<(PathBuf, CharacterSet)> {
        self.subsets.borrow().clone()
    }

    /// Write a fake font file.
    pub fn write_font(path: &Path, drawn: &str, undefined: &str) {
        fs::write(path, format!("{drawn}|{undefined}")).expect("write fake font");
    }
}

impl FontEngine for FakeEngine {
    fn lookup_glyphs(&self, font: &Path, chars: &CharacterSet) -> Result<GlyphLookup> {
        let contents = fs::read_to_string(font)
            .with_context(|| format!("Failed to read font {}", font.display()))?;
        let (drawn, undefined) = contents.split_once('|').unwrap_or((contents.as_str(), ""));

        let mut lookup = GlyphLookup::new(NOTDEF_GLYPH);
        for (index, c) in drawn.chars().enumerate() {
            if chars.contains(c) {
                lookup.glyphs.insert(c, index as u32 + 1);
            }
        }
        for c in undefined.chars() {
            if chars.contains(c) {
                lookup.glyphs.insert(c, NOTDEF_GLYPH);
            }
        }
        Ok(lookup)
    }

    async fn write_subset(&self, request: &SubsetRequest<'_>) -> Result<()> {
        if self.failing.contains(request.source) {
            return Err(anyhow!("simulated failure for {}", request.source.display()));
        }
        fs::metadata(request.source)
            .with_context(|| format!("Failed to open {}", request.source.display()))?;

        let name = request
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::write(
            request.output,
            format!("{FAKE_MAGIC}\n{name}\n{}\n", request.chars),
        )?;

        self.subsets
            .borrow_mut()
            .push((request.source.to_path_buf(), request.chars.clone()));
        Ok(())
    }
}
