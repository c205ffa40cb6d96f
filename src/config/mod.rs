//! Configuration management
//!
//! This module handles all configuration aspects:
//! - The font plan (ranges, families, weights, retired output schemes)
//! - User configuration files
//! - Code point notation in plan files

pub mod codepoint;
pub mod plan;
pub mod user_config;

pub use plan::{
    artifact_name, FamilyPlan, FontPlan, LayoutPolicy, PlanError, RangeSpec, ARTIFACT_EXTENSION,
};
pub use user_config::ConfigFile;
