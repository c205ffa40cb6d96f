//! Run report
//!
//! Everything a run decided, kept for the closing summary and for the
//! optional JSON report consumed by build tooling.

use crate::coverage::CoverageResult;
use crate::scan::CharacterSet;
use crate::subset::SubsetOutcome;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Content files read
    pub content_files: usize,
    /// Content files that could not be decoded
    pub skipped_files: Vec<PathBuf>,
    /// Distinct characters in content, before the baseline is added
    pub content_characters: usize,
    /// Characters per configured range, keyed by range id
    pub groups: BTreeMap<String, CharacterSet>,
    pub families: Vec<FamilyReport>,
    /// Files deleted by the retired-output sweep
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub id: String,
    /// Characters selected for the family before coverage checking
    pub selected: CharacterSet,
    /// Coverage against the reference weight, when it could be checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageResult>,
    pub status: FamilyStatus,
    pub slots: Vec<SlotReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FamilyStatus {
    /// Every planned weight was attempted
    Processed,
    /// No characters selected; stale artifacts were cleared
    Empty,
    /// The reference font is not installed; artifacts were left as they were
    MissingReference { source: PathBuf },
    /// The reference font could not be read
    CoverageFailed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub weight: u16,
    pub artifact: PathBuf,
    /// Characters the reference covers but this weight's font lacks
    #[serde(skip_serializing_if = "CharacterSet::is_empty")]
    pub weight_missing: CharacterSet,
    pub outcome: SlotOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlotOutcome {
    Completed(SubsetOutcome),
    Failed { error: String },
}

impl SlotOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SlotOutcome::Failed { .. })
    }
}

/// Counts for the closing summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub written: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(content_dir: &Path, output_dir: &Path) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            content_dir: content_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            content_files: 0,
            skipped_files: Vec::new(),
            content_characters: 0,
            groups: BTreeMap::new(),
            families: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn family(&self, id: &str) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.id == id)
    }

    pub fn slots(&self) -> impl Iterator<Item = &SlotReport> {
        self.families.iter().flat_map(|f| f.slots.iter())
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally {
            removed: self.removed.len(),
            ..Tally::default()
        };
        for slot in self.slots() {
            match &slot.outcome {
                SlotOutcome::Completed(SubsetOutcome::Written { .. }) => tally.written += 1,
                SlotOutcome::Completed(SubsetOutcome::RemovedStale) => tally.removed += 1,
                SlotOutcome::Completed(_) => tally.skipped += 1,
                SlotOutcome::Failed { .. } => tally.failed += 1,
            }
        }
        for family in &self.families {
            if matches!(family.status, FamilyStatus::CoverageFailed { .. }) {
                tally.failed += 1;
            }
        }
        tally
    }

    /// Write the report as pretty JSON.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl FamilyReport {
    pub fn slot(&self, weight: u16) -> Option<&SlotReport> {
        self.slots.iter().find(|s| s.weight == weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        let mut report = RunReport::new(Path::new("/content"), Path::new("/out"));
        report.removed.push(PathBuf::from("/out/Old.woff2"));
        report.families.push(FamilyReport {
            id: "Serif".into(),
            selected: CharacterSet::from_text("字"),
            coverage: None,
            status: FamilyStatus::Processed,
            slots: vec![
                SlotReport {
                    weight: 400,
                    artifact: PathBuf::from("/out/Serif-400.woff2"),
                    weight_missing: CharacterSet::new(),
                    outcome: SlotOutcome::Completed(SubsetOutcome::Written { bytes: 10 }),
                },
                SlotReport {
                    weight: 600,
                    artifact: PathBuf::from("/out/Serif-600.woff2"),
                    weight_missing: CharacterSet::new(),
                    outcome: SlotOutcome::Completed(SubsetOutcome::SkippedMissingSource {
                        source: PathBuf::from("/fonts/Serif-SemiBold.otf"),
                    }),
                },
                SlotReport {
                    weight: 700,
                    artifact: PathBuf::from("/out/Serif-700.woff2"),
                    weight_missing: CharacterSet::new(),
                    outcome: SlotOutcome::Failed {
                        error: "boom".into(),
                    },
                },
            ],
        });
        report
    }

    #[test]
    fn test_tally() {
        let tally = report().tally();
        assert_eq!(
            tally,
            Tally {
                written: 1,
                removed: 1,
                skipped: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        report().write_json(&path).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let slots = &json["families"][0]["slots"];
        assert_eq!(slots[0]["outcome"]["status"], "written");
        assert_eq!(slots[0]["outcome"]["bytes"], 10);
        assert_eq!(slots[1]["outcome"]["status"], "skipped_missing_source");
        assert_eq!(slots[2]["outcome"]["error"], "boom");
        assert_eq!(json["families"][0]["status"]["state"], "processed");
        assert_eq!(json["families"][0]["selected"], "字");
    }
}
