//! Content scanner
//!
//! Walks a content corpus and folds every character of every recognised
//! text file into one `CharacterSet`.

use super::charset::CharacterSet;
use anyhow::Result;
use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Result of scanning a content directory
#[derive(Debug, Clone, Default)]
pub struct ContentScan {
    /// Every character used by the scanned files
    pub chars: CharacterSet,
    /// Files that were read, in path order
    pub files: Vec<PathBuf>,
    /// Files that matched an extension but could not be read or decoded
    pub skipped: Vec<PathBuf>,
}

/// Scan `content_dir` recursively for files ending in one of `extensions`.
///
/// Extensions are matched case-insensitively and without the leading dot.
/// An empty corpus is reported as a warning and yields an empty set.
pub fn scan(content_dir: &Path, extensions: &[String]) -> Result<ContentScan> {
    let files = collect_content_files(content_dir, extensions)?;

    if files.is_empty() {
        warn!("No content files found in {}", content_dir.display());
        return Ok(ContentScan::default());
    }

    info!("Scanning {} content files...", files.len());
    let result = read_content_files(files);
    debug!("Scanned {} distinct characters", result.chars.len());
    Ok(result)
}

/// Fold the characters of `files` into one scan.
///
/// A file that cannot be read or decoded is reported and skipped.
fn read_content_files(files: Vec<PathBuf>) -> ContentScan {
    let mut result = ContentScan::default();

    for path in files {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                result.skipped.push(path);
                continue;
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => {
                let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&text);
                result.chars.extend_from_text(text);
                result.files.push(path);
            }
            Err(e) => {
                warn!("Skipping {}: not valid UTF-8 ({})", path.display(), e);
                result.skipped.push(path);
            }
        }
    }

    result
}

fn collect_content_files(content_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walk = WalkDir::new(content_dir)
        .sort(true)
        .parallelism(Parallelism::Serial);
    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        let file_type = entry.file_type();
        // Linked files count as content; linked directories are not descended.
        let is_file = file_type.is_file()
            || (file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()));
        if is_file && has_content_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn has_content_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(extension))
}
