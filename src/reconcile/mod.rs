//! Artifact reconciliation
//!
//! The output directory is derived entirely from the current plan. Slots
//! whose character set became empty lose their artifact, and files left by
//! retired naming schemes, retired weights or interrupted runs are swept.
//! Files the plan knows nothing about are left alone.

use crate::config::{FontPlan, PlanError, ARTIFACT_EXTENSION};
use crate::subset::TEMP_PREFIX;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Delete the artifact at `path` if there is one.
///
/// Returns whether a file was removed.
pub fn remove_stale(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// What the sweep decides about one file in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Named after a slot of the current plan
    Current,
    /// Matches a retired naming pattern
    RetiredScheme,
    /// Belongs to a current family but a weight it no longer has
    RetiredWeight,
    /// Staging file of a run that did not finish
    Interrupted,
    /// Not produced by this tool
    Foreign,
}

impl Disposition {
    pub fn is_removable(self) -> bool {
        matches!(
            self,
            Disposition::RetiredScheme | Disposition::RetiredWeight | Disposition::Interrupted
        )
    }
}

pub struct Reconciler {
    retired: Vec<Regex>,
    current: HashSet<String>,
    family_weights: HashMap<String, BTreeSet<u16>>,
}

impl Reconciler {
    pub fn new(plan: &FontPlan) -> Result<Self, PlanError> {
        let mut current = HashSet::new();
        let mut family_weights = HashMap::new();
        for family in &plan.families {
            for &weight in family.weights.keys() {
                current.insert(family.artifact_name(weight));
            }
            family_weights.insert(
                family.id.clone(),
                family.weights.keys().copied().collect::<BTreeSet<_>>(),
            );
        }

        Ok(Self {
            retired: plan.retired_patterns()?,
            current,
            family_weights,
        })
    }

    pub fn disposition(&self, file_name: &str) -> Disposition {
        if file_name.starts_with(TEMP_PREFIX) && file_name.ends_with(".tmp") {
            return Disposition::Interrupted;
        }
        // A current slot is never swept, even if a retired pattern is too broad.
        if self.current.contains(file_name) {
            return Disposition::Current;
        }
        if self.retired.iter().any(|pattern| pattern.is_match(file_name)) {
            return Disposition::RetiredScheme;
        }
        if self.is_retired_weight(file_name) {
            return Disposition::RetiredWeight;
        }
        Disposition::Foreign
    }

    fn is_retired_weight(&self, file_name: &str) -> bool {
        let Some(stem) = file_name
            .strip_suffix(ARTIFACT_EXTENSION)
            .and_then(|rest| rest.strip_suffix('.'))
        else {
            return false;
        };
        let Some((family, weight)) = stem.rsplit_once('-') else {
            return false;
        };
        let Ok(weight) = weight.parse::<u16>() else {
            return false;
        };
        self.family_weights
            .get(family)
            .is_some_and(|weights| !weights.contains(&weight))
    }

    /// Remove every retired or interrupted file from `output_dir`.
    ///
    /// Returns the removed paths in name order. A file that cannot be removed
    /// is reported and skipped.
    pub fn sweep(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut candidates = Vec::new();
        let entries = fs::read_dir(output_dir)
            .with_context(|| format!("Failed to list {}", output_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let disposition = self.disposition(&name);
            debug!("{}: {:?}", name, disposition);
            if disposition.is_removable() {
                candidates.push((entry.path(), disposition));
            }
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut removed = Vec::new();
        for (path, disposition) in candidates {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("  ✗ Removed {} ({})", path.display(), describe(disposition));
                    removed.push(path);
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        Ok(removed)
    }
}

fn describe(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Current => "current",
        Disposition::RetiredScheme => "retired naming scheme",
        Disposition::RetiredWeight => "retired weight",
        Disposition::Interrupted => "interrupted write",
        Disposition::Foreign => "not ours",
    }
}
