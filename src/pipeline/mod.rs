//! Pipeline orchestration
//!
//! One run is strictly sequential: scan the content, then for every family
//! check coverage against the reference weight and produce each weight's
//! artifact, then sweep retired files. A failure in one slot is recorded
//! and the run moves on; only the conditions in [`PipelineError`] stop it.

pub mod report;

pub use report::{FamilyReport, FamilyStatus, RunReport, SlotOutcome, SlotReport, Tally};

use crate::config::{FamilyPlan, FontPlan, PlanError};
use crate::coverage::{check_coverage, report_gaps};
use crate::engine::FontEngine;
use crate::reconcile::Reconciler;
use crate::scan::{always_include, classify, family_characters, scan, CharacterSet};
use crate::subset::{generate_subset, SubsetJob};
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Conditions that abort a run before it completes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("content directory not found: {}", .0.display())]
    ContentDirMissing(PathBuf),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reference font for required family '{family}' not found: {}", .path.display())]
    ReferenceFontMissing { family: String, path: PathBuf },

    #[error("failed to scan content: {0:#}")]
    Scan(anyhow::Error),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

pub struct Pipeline<'a, E> {
    engine: &'a E,
    plan: &'a FontPlan,
}

impl<'a, E: FontEngine> Pipeline<'a, E> {
    pub fn new(engine: &'a E, plan: &'a FontPlan) -> Self {
        Self { engine, plan }
    }

    /// Bring `output_dir` in line with the characters used under `content_dir`.
    pub async fn run(
        &self,
        content_dir: &Path,
        output_dir: &Path,
    ) -> Result<RunReport, PipelineError> {
        if !content_dir.is_dir() {
            return Err(PipelineError::ContentDirMissing(content_dir.to_path_buf()));
        }
        let reconciler = Reconciler::new(self.plan)?;
        self.preflight()?;
        fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut report = RunReport::new(content_dir, output_dir);

        info!("Scanning {}", content_dir.display());
        let scanned = scan(content_dir, &self.plan.content_extensions)
            .map_err(PipelineError::Scan)?;
        report.content_files = scanned.files.len();
        report.skipped_files = scanned.skipped;
        report.content_characters = scanned.chars.len();

        let baseline = always_include(&self.plan.always_include_extra);
        let chars = scanned.chars.union(&baseline);
        info!(
            "  {} files, {} unique characters ({} with baseline)",
            report.content_files,
            report.content_characters,
            chars.len()
        );

        report.groups = classify(&scanned.chars, &self.plan.ranges);
        for range in &self.plan.ranges {
            let found = report.groups.get(&range.id).map_or(0, CharacterSet::len);
            info!("  {}: {} characters", range.label, found);
        }

        for family in &self.plan.families {
            let family_report = self.process_family(family, &chars, output_dir).await;
            report.families.push(family_report);
        }

        match reconciler.sweep(output_dir) {
            Ok(removed) => report.removed = removed,
            Err(e) => warn!("Failed to sweep {}: {:#}", output_dir.display(), e),
        }

        report.finished_at = Some(Utc::now());
        let tally = report.tally();
        info!(
            "Done: {} written, {} removed, {} skipped, {} failed",
            tally.written, tally.removed, tally.skipped, tally.failed
        );
        Ok(report)
    }

    /// Fail before touching the output directory if a required reference
    /// font is not installed.
    fn preflight(&self) -> Result<(), PipelineError> {
        for family in self.plan.families.iter().filter(|f| f.required) {
            let path = self.reference_source(family);
            if !path.is_file() {
                return Err(PipelineError::ReferenceFontMissing {
                    family: family.id.clone(),
                    path,
                });
            }
        }
        Ok(())
    }

    fn reference_source(&self, family: &FamilyPlan) -> PathBuf {
        family
            .source_path(&self.plan.font_dir, self.plan.reference_weight)
            .unwrap_or_else(|| self.plan.font_dir.clone())
    }

    async fn process_family(
        &self,
        family: &FamilyPlan,
        chars: &CharacterSet,
        output_dir: &Path,
    ) -> FamilyReport {
        let selected = family_characters(self.plan, family, chars);
        info!("{} ({}): {} characters", family.id, family.label, selected.len());

        let mut report = FamilyReport {
            id: family.id.clone(),
            selected,
            coverage: None,
            status: FamilyStatus::Processed,
            slots: Vec::new(),
        };

        if report.selected.is_empty() {
            report.status = FamilyStatus::Empty;
            let nothing = CharacterSet::new();
            for &weight in family.weights.keys() {
                let slot = self
                    .process_slot(family, weight, &nothing, CharacterSet::new(), output_dir)
                    .await;
                report.slots.push(slot);
            }
            return report;
        }

        let reference = self.reference_source(family);
        if !reference.is_file() {
            warn!("  ⚠ Reference font not found: {}", reference.display());
            warn!(
                "    Skipping {}; its characters will show in fallback fonts",
                family.id
            );
            report.status = FamilyStatus::MissingReference { source: reference };
            return report;
        }

        let coverage = match check_coverage(self.engine, &reference, &report.selected) {
            Ok(coverage) => coverage,
            Err(e) => {
                error!("  ✗ {}: coverage check failed: {:#}", family.id, e);
                report.status = FamilyStatus::CoverageFailed {
                    error: format!("{e:#}"),
                };
                return report;
            }
        };
        report_gaps(
            &format!("{}-{}", family.id, self.plan.reference_weight),
            &reference,
            &coverage,
        );

        for &weight in family.weights.keys() {
            let slot = self.weight_slot(family, weight, &coverage.covered, output_dir).await;
            report.slots.push(slot);
        }
        report.coverage = Some(coverage);
        report
    }

    /// Narrow the reference-covered set to what this weight's own font draws,
    /// then produce the slot.
    async fn weight_slot(
        &self,
        family: &FamilyPlan,
        weight: u16,
        covered: &CharacterSet,
        output_dir: &Path,
    ) -> SlotReport {
        let verify = self.plan.verify_each_weight
            && weight != self.plan.reference_weight
            && !covered.is_empty();
        let source = family
            .source_path(&self.plan.font_dir, weight)
            .unwrap_or_default();
        if !verify || !source.is_file() {
            return self
                .process_slot(family, weight, covered, CharacterSet::new(), output_dir)
                .await;
        }

        match check_coverage(self.engine, &source, covered) {
            Ok(own) => {
                if !own.is_complete() {
                    report_gaps(&format!("{}-{}", family.id, weight), &source, &own);
                }
                self.process_slot(family, weight, &own.covered, own.missing, output_dir)
                    .await
            }
            Err(e) => {
                error!("  ✗ {}-{}: coverage check failed: {:#}", family.id, weight, e);
                SlotReport {
                    weight,
                    artifact: output_dir.join(family.artifact_name(weight)),
                    weight_missing: CharacterSet::new(),
                    outcome: SlotOutcome::Failed {
                        error: format!("{e:#}"),
                    },
                }
            }
        }
    }

    async fn process_slot(
        &self,
        family: &FamilyPlan,
        weight: u16,
        chars: &CharacterSet,
        weight_missing: CharacterSet,
        output_dir: &Path,
    ) -> SlotReport {
        let job = SubsetJob {
            family,
            weight,
            source: family
                .source_path(&self.plan.font_dir, weight)
                .unwrap_or_default(),
            chars,
            output_dir,
            is_reference: weight == self.plan.reference_weight,
        };
        let artifact = job.artifact_path();
        debug!("{}-{}: {}", family.id, weight, job.source.display());

        let outcome = match generate_subset(self.engine, &job).await {
            Ok(outcome) => SlotOutcome::Completed(outcome),
            Err(e) => {
                error!("  ✗ {}-{} failed: {:#}", family.id, weight, e);
                SlotOutcome::Failed {
                    error: format!("{e:#}"),
                }
            }
        };

        SlotReport {
            weight,
            artifact,
            weight_missing,
            outcome,
        }
    }
}

/// Run the whole pipeline once.
pub async fn run<E: FontEngine>(
    engine: &E,
    plan: &FontPlan,
    content_dir: &Path,
    output_dir: &Path,
) -> Result<RunReport, PipelineError> {
    Pipeline::new(engine, plan).run(content_dir, output_dir).await
}
