//! Subset generator
//!
//! Produces one WOFF2 artifact per (family, weight) slot. The artifact is
//! written next to its final location under a temporary name and renamed
//! into place, so readers never observe a half-written font.

use crate::config::FamilyPlan;
use crate::engine::{FontEngine, SubsetRequest};
use crate::reconcile;
use crate::scan::CharacterSet;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix of in-flight artifacts inside the output directory.
pub const TEMP_PREFIX: &str = ".fontsieve-";

/// Longest character list printed verbatim in progress lines.
const DISPLAY_LIMIT: usize = 64;

/// One (family, weight) slot to produce.
#[derive(Debug, Clone)]
pub struct SubsetJob<'a> {
    pub family: &'a FamilyPlan,
    pub weight: u16,
    pub source: PathBuf,
    pub chars: &'a CharacterSet,
    pub output_dir: &'a Path,
    /// The reference weight warns when its source is missing
    pub is_reference: bool,
}

impl SubsetJob<'_> {
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(self.family.artifact_name(self.weight))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubsetOutcome {
    /// A fresh artifact replaced whatever was at the slot
    Written { bytes: u64 },
    /// Nothing to carry; an artifact left by an earlier run was deleted
    RemovedStale,
    /// Nothing to carry and nothing on disk
    SkippedEmpty,
    /// The source font is not installed; the slot was left as it was
    SkippedMissingSource { source: PathBuf },
}

/// Produce, skip, or clear the artifact for one slot.
pub async fn generate_subset<E: FontEngine>(
    engine: &E,
    job: &SubsetJob<'_>,
) -> Result<SubsetOutcome> {
    let target = job.artifact_path();
    let label = format!("{}-{}", job.family.id, job.weight);

    if job.chars.is_empty() {
        return if reconcile::remove_stale(&target)? {
            info!("  · {}: no characters, removed stale {}", label, target.display());
            Ok(SubsetOutcome::RemovedStale)
        } else {
            info!("  · {}: no characters found, skipping", label);
            Ok(SubsetOutcome::SkippedEmpty)
        };
    }

    if !job.source.is_file() {
        if job.is_reference {
            warn!("  ⚠ Source font not found: {}", job.source.display());
            warn!(
                "    Skipping {}; {} characters will show in fallback fonts",
                label, job.family.label
            );
        } else {
            info!(
                "  · {}: source font not found ({}), skipping",
                label,
                job.source.display()
            );
        }
        return Ok(SubsetOutcome::SkippedMissingSource {
            source: job.source.clone(),
        });
    }

    if job.chars.len() <= DISPLAY_LIMIT {
        info!("  → {}: {} chars [{}]", label, job.chars.len(), job.chars);
    } else {
        info!("  → {}: {} chars", label, job.chars.len());
    }

    let staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(job.output_dir)
        .with_context(|| format!("Failed to stage artifact in {}", job.output_dir.display()))?;

    let request = SubsetRequest {
        source: &job.source,
        chars: job.chars,
        layout: &job.family.layout,
        output: staged.path(),
    };
    engine.write_subset(&request).await?;

    let bytes = fs::metadata(staged.path())
        .with_context(|| format!("Subset output missing for {label}"))?
        .len();
    if bytes == 0 {
        return Err(anyhow!("Subsetter produced an empty file for {label}"));
    }
    make_world_readable(staged.path())?;

    staged
        .persist(&target)
        .with_context(|| format!("Failed to move artifact into {}", target.display()))?;

    info!("    Wrote {} ({} bytes)", target.display(), group_thousands(bytes));
    Ok(SubsetOutcome::Written { bytes })
}

// Staged files are created private; artifacts are served to everyone.
#[cfg(unix)]
fn make_world_readable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_world_readable(_path: &Path) -> Result<()> {
    Ok(())
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
