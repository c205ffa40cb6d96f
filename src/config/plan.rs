//! Font plan: the static configuration of a subsetting run
//!
//! A plan names the character ranges worth classifying, the output families,
//! the source font for every weight of every family, and the file name
//! patterns of retired output schemes. It is loaded once, validated, and then
//! passed by reference into every stage.

use super::codepoint;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// The plan compiled into the binary, used when no other plan is configured.
pub const BUILTIN_PLAN_JSON: &str = include_str!("default_plan.json");

/// Extension of every generated artifact.
pub const ARTIFACT_EXTENSION: &str = "woff2";

pub const MIN_WEIGHT: u16 = 100;
pub const MAX_WEIGHT: u16 = 900;

const MAX_CODE_POINT: u32 = 0x10FFFF;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("failed to read plan {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("plan defines no families")]
    NoFamilies,

    #[error("plan defines no content extensions")]
    NoExtensions,

    #[error("invalid {kind} identifier '{id}': use ASCII letters, digits, '-' or '_'")]
    InvalidId { kind: &'static str, id: String },

    #[error("duplicate {kind} identifier '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("reference weight {0} is outside 100-900")]
    ReferenceWeightOutOfRange(u16),

    #[error("family '{family}' defines no weights")]
    NoWeights { family: String },

    #[error("family '{family}': weight {weight} is outside 100-900")]
    WeightOutOfRange { family: String, weight: u16 },

    #[error("family '{family}': weight {weight} has an invalid source file name '{file}'")]
    InvalidSourceName {
        family: String,
        weight: u16,
        file: String,
    },

    #[error("family '{family}' has no source font for the reference weight {weight}")]
    MissingReferenceWeight { family: String, weight: u16 },

    #[error("family '{family}' references unknown range '{range}'")]
    UnknownRange { family: String, range: String },

    #[error("range '{range}': start U+{start:04X} is after end U+{end:04X}")]
    InvertedRange { range: String, start: u32, end: u32 },

    #[error("range '{range}': end U+{end:04X} is beyond U+10FFFF")]
    RangeBeyondUnicode { range: String, end: u32 },

    #[error("range '{range}': whitelist character {character:?} lies outside the range")]
    WhitelistOutsideRange { range: String, character: char },

    #[error("invalid retired pattern '{pattern}': {source}")]
    RetiredPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Complete configuration of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontPlan {
    /// Directory holding the source fonts named by each family's weights
    pub font_dir: PathBuf,
    /// Weight whose font is the ground truth for coverage
    #[serde(default = "default_reference_weight")]
    pub reference_weight: u16,
    /// Content file extensions, without the leading dot
    #[serde(default = "default_content_extensions")]
    pub content_extensions: Vec<String>,
    /// Characters added to the always-include baseline
    #[serde(default)]
    pub always_include_extra: String,
    /// Re-check coverage against every weight, not just the reference
    #[serde(default = "default_true")]
    pub verify_each_weight: bool,
    #[serde(default)]
    pub ranges: Vec<RangeSpec>,
    pub families: Vec<FamilyPlan>,
    /// Regular expressions matched against whole output file names
    #[serde(default)]
    pub retired: Vec<String>,
}

/// A classified interval of code points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeSpec {
    pub id: String,
    pub label: String,
    #[serde(with = "codepoint")]
    pub start: u32,
    #[serde(with = "codepoint")]
    pub end: u32,
    /// When present, only these characters of the interval belong to the range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<String>,
}

impl RangeSpec {
    pub fn contains(&self, c: char) -> bool {
        let cp = u32::from(c);
        if cp < self.start || cp > self.end {
            return false;
        }
        match &self.whitelist {
            Some(allowed) => allowed.contains(c),
            None => true,
        }
    }

    pub fn is_whitelist_only(&self) -> bool {
        self.whitelist.is_some()
    }
}

/// One output family and the source font of each of its weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyPlan {
    pub id: String,
    pub label: String,
    /// Range identifiers; empty selects every renderable character in content
    #[serde(default)]
    pub ranges: Vec<String>,
    /// Weight to source font file name, relative to the plan's font directory
    pub weights: BTreeMap<u16, String>,
    #[serde(default)]
    pub layout: LayoutPolicy,
    /// A missing reference font for a required family aborts the run
    #[serde(default)]
    pub required: bool,
}

impl FamilyPlan {
    /// Absolute path of the source font for `weight`, if the weight is planned.
    pub fn source_path(&self, font_dir: &Path, weight: u16) -> Option<PathBuf> {
        self.weights.get(&weight).map(|file| font_dir.join(file))
    }

    /// File name of the artifact for `weight`, e.g. `SerifSC-400.woff2`.
    pub fn artifact_name(&self, weight: u16) -> String {
        artifact_name(&self.id, weight)
    }

    /// Whether the family selects characters through explicit ranges.
    pub fn is_range_limited(&self) -> bool {
        !self.ranges.is_empty()
    }
}

pub fn artifact_name(family_id: &str, weight: u16) -> String {
    format!("{family_id}-{weight}.{ARTIFACT_EXTENSION}")
}

/// How much OpenType layout survives subsetting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    /// Drop every layout table for the smallest possible file
    #[default]
    Strip,
    /// Keep only the listed layout features
    Retain(Vec<String>),
}

impl LayoutPolicy {
    pub const STANDARD_FEATURES: [&'static str; 5] = ["kern", "liga", "calt", "ccmp", "locl"];

    pub fn retain_standard() -> Self {
        LayoutPolicy::Retain(
            Self::STANDARD_FEATURES
                .iter()
                .map(|f| f.to_string())
                .collect(),
        )
    }
}

fn default_reference_weight() -> u16 {
    400
}

fn default_content_extensions() -> Vec<String> {
    vec!["md".to_string(), "mdx".to_string()]
}

fn default_true() -> bool {
    true
}

impl FontPlan {
    /// The plan compiled into the binary.
    pub fn builtin() -> Result<Self, PlanError> {
        Self::from_json(BUILTIN_PLAN_JSON)
    }

    /// Parse and validate a plan.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let plan: FontPlan = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load and validate a plan file.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let contents = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_font_dir(mut self, font_dir: impl Into<PathBuf>) -> Self {
        self.font_dir = font_dir.into();
        self
    }

    pub fn range(&self, id: &str) -> Option<&RangeSpec> {
        self.ranges.iter().find(|r| r.id == id)
    }

    pub fn family(&self, id: &str) -> Option<&FamilyPlan> {
        self.families.iter().find(|f| f.id == id)
    }

    /// Ranges referenced by `family`, in the family's order.
    ///
    /// Unknown identifiers are skipped; `validate` rejects them up front.
    pub fn family_ranges<'a>(&'a self, family: &'a FamilyPlan) -> Vec<&'a RangeSpec> {
        family
            .ranges
            .iter()
            .filter_map(|id| self.range(id))
            .collect()
    }

    /// Compile the retired file name patterns, anchored to whole names.
    pub fn retired_patterns(&self) -> Result<Vec<Regex>, PlanError> {
        self.retired
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    PlanError::RetiredPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Check every structural invariant of the plan.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.families.is_empty() {
            return Err(PlanError::NoFamilies);
        }
        if self.content_extensions.is_empty() {
            return Err(PlanError::NoExtensions);
        }
        if !is_weight(self.reference_weight) {
            return Err(PlanError::ReferenceWeightOutOfRange(self.reference_weight));
        }

        let mut range_ids = HashSet::new();
        for range in &self.ranges {
            check_id("range", &range.id)?;
            if !range_ids.insert(range.id.as_str()) {
                return Err(PlanError::DuplicateId {
                    kind: "range",
                    id: range.id.clone(),
                });
            }
            validate_range(range)?;
        }

        let mut family_ids = HashSet::new();
        for family in &self.families {
            check_id("family", &family.id)?;
            if !family_ids.insert(family.id.as_str()) {
                return Err(PlanError::DuplicateId {
                    kind: "family",
                    id: family.id.clone(),
                });
            }
            self.validate_family(family)?;
        }

        self.retired_patterns()?;
        Ok(())
    }

    fn validate_family(&self, family: &FamilyPlan) -> Result<(), PlanError> {
        if family.weights.is_empty() {
            return Err(PlanError::NoWeights {
                family: family.id.clone(),
            });
        }

        for (&weight, file) in &family.weights {
            if !is_weight(weight) {
                return Err(PlanError::WeightOutOfRange {
                    family: family.id.clone(),
                    weight,
                });
            }
            if !is_plain_file_name(file) {
                return Err(PlanError::InvalidSourceName {
                    family: family.id.clone(),
                    weight,
                    file: file.clone(),
                });
            }
        }

        if !family.weights.contains_key(&self.reference_weight) {
            return Err(PlanError::MissingReferenceWeight {
                family: family.id.clone(),
                weight: self.reference_weight,
            });
        }

        for range in &family.ranges {
            if self.range(range).is_none() {
                return Err(PlanError::UnknownRange {
                    family: family.id.clone(),
                    range: range.clone(),
                });
            }
        }

        Ok(())
    }
}

fn validate_range(range: &RangeSpec) -> Result<(), PlanError> {
    if range.end > MAX_CODE_POINT {
        return Err(PlanError::RangeBeyondUnicode {
            range: range.id.clone(),
            end: range.end,
        });
    }
    if range.start > range.end {
        return Err(PlanError::InvertedRange {
            range: range.id.clone(),
            start: range.start,
            end: range.end,
        });
    }
    if let Some(whitelist) = &range.whitelist {
        if let Some(character) = whitelist
            .chars()
            .find(|c| u32::from(*c) < range.start || u32::from(*c) > range.end)
        {
            return Err(PlanError::WhitelistOutsideRange {
                range: range.id.clone(),
                character,
            });
        }
    }
    Ok(())
}

fn is_weight(weight: u16) -> bool {
    (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight)
}

// Identifiers end up in output file names.
fn check_id(kind: &'static str, id: &str) -> Result<(), PlanError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PlanError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}
