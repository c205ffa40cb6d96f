//! Production font engine
//!
//! Glyph lookups are answered in-process from the font's own character map
//! with skrifa. Subsetting and WOFF2 flavoring are delegated to fontTools'
//! `pyftsubset`, run as an external program.

use super::{FontEngine, GlyphLookup, SubsetRequest, NOTDEF_GLYPH};
use crate::config::LayoutPolicy;
use crate::scan::charset::format_code_point;
use crate::scan::CharacterSet;
use anyhow::{anyhow, Context, Result};
use skrifa::{FontRef, MetadataProvider};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

/// Program looked up on PATH when no other subsetter is configured.
pub const DEFAULT_PROGRAM: &str = "pyftsubset";

/// Tables that never reach a web artifact.
const METADATA_TABLES: [&str; 2] = ["meta", "DSIG"];

/// Complex layout tables removed under `LayoutPolicy::Strip`.
const LAYOUT_TABLES: [&str; 6] = ["GSUB", "GPOS", "GDEF", "MATH", "BASE", "JSTF"];

pub struct PyftsubsetEngine {
    program: PathBuf,
}

impl Default for PyftsubsetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PyftsubsetEngine {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line for one subset, reading code points from `unicodes_file`.
    pub fn subset_arguments(request: &SubsetRequest<'_>, unicodes_file: &Path) -> Vec<OsString> {
        let mut args = vec![request.source.as_os_str().to_os_string()];
        args.push(prefixed("--unicodes-file=", unicodes_file));
        args.push(prefixed("--output-file=", request.output));
        args.push("--flavor=woff2".into());
        args.push("--desubroutinize".into());
        args.push("--no-recalc-timestamp".into());

        let mut dropped: Vec<&str> = METADATA_TABLES.to_vec();
        match request.layout {
            LayoutPolicy::Retain(features) if !features.is_empty() => {
                args.push(format!("--layout-features={}", features.join(",")).into());
            }
            _ => dropped.extend(LAYOUT_TABLES),
        }
        args.push(format!("--drop-tables+={}", dropped.join(",")).into());

        args
    }
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}

fn unicode_file_contents(chars: &CharacterSet) -> String {
    let mut contents = String::new();
    for cp in chars.code_points() {
        contents.push_str(&format_code_point(cp));
        contents.push('\n');
    }
    contents
}

impl FontEngine for PyftsubsetEngine {
    fn lookup_glyphs(&self, font: &Path, chars: &CharacterSet) -> Result<GlyphLookup> {
        let data = std::fs::read(font)
            .with_context(|| format!("Failed to read font {}", font.display()))?;
        // Collections resolve to their first face.
        let font_ref = FontRef::from_index(&data, 0)
            .map_err(|e| anyhow!("Failed to parse font {}: {}", font.display(), e))?;

        let charmap = font_ref.charmap();
        let mut lookup = GlyphLookup::new(NOTDEF_GLYPH);
        for &c in chars {
            if let Some(glyph_id) = charmap.map(c) {
                lookup.glyphs.insert(c, glyph_id.to_u32());
            }
        }

        debug!(
            "{}: {} of {} characters mapped",
            font.display(),
            lookup.glyphs.len(),
            chars.len()
        );
        Ok(lookup)
    }

    async fn write_subset(&self, request: &SubsetRequest<'_>) -> Result<()> {
        let unicodes = NamedTempFile::new()
            .context("Failed to create temporary file for the unicode list")?;
        tokio::fs::write(unicodes.path(), unicode_file_contents(request.chars))
            .await
            .context("Failed to write the unicode list")?;

        let args = Self::subset_arguments(request, unicodes.path());
        debug!("Running {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} failed with status {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}
