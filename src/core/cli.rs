//! Command line interface for fontsieve
//!
//! Handles parsing command line arguments and provides validation for
//! user inputs before any work starts.

use crate::config::{ConfigFile, FontPlan, PlanError};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

/// fontsieve CLI arguments
///
/// Examples:
///   fontsieve content/ public/fonts/                  # Subset with the built-in plan
///   fontsieve --plan fonts.json content/ dist/fonts/  # Use a custom plan
///   fontsieve --font-dir ~/Fonts content/ dist/fonts/ # Source fonts from elsewhere
///   fontsieve --report run.json content/ dist/fonts/  # Also write a JSON report
///   fontsieve --print-plan                            # Show the effective plan
///   fontsieve --new-config                            # Create ~/.config/fontsieve
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "fontsieve",
    version,
    about = "Subset web fonts down to the characters your content uses",
    long_about = "fontsieve scans a content directory, works out which characters each font family must carry, checks them against the fonts' own character maps and writes one minimal WOFF2 subset per family and weight."
)]
pub struct CliArgs {
    /// CONTENT_DIR and OUTPUT_DIR
    ///
    /// Every text file under CONTENT_DIR with a planned extension is scanned.
    /// Artifacts are written into OUTPUT_DIR, which is created if needed.
    #[clap(value_name = "DIR", help = "CONTENT_DIR OUTPUT_DIR")]
    pub paths: Vec<PathBuf>,

    /// Font plan to use instead of the built-in one
    #[clap(
        long = "plan",
        short = 'p',
        help = "Font plan (JSON) to use",
        long_help = "Path to a font plan describing ranges, families, weights and retired output names. Overrides the plan named in settings.json and the built-in plan."
    )]
    pub plan: Option<PathBuf>,

    /// Directory holding the source fonts
    #[clap(
        long = "font-dir",
        help = "Directory holding the source fonts",
        long_help = "Directory holding the installed source fonts. Overrides font_dir in settings.json and in the plan."
    )]
    pub font_dir: Option<PathBuf>,

    /// Write a JSON report of the run
    #[clap(long = "report", help = "Write a JSON report of the run to this file")]
    pub report: Option<PathBuf>,

    /// Also log to ~/.config/fontsieve/logs/
    #[clap(
        long = "log-file",
        help = "Also write logs to ~/.config/fontsieve/logs/",
        long_help = "Append everything logged during the run to ~/.config/fontsieve/logs/fontsieve-YYYY-MM-DD.log in addition to the console."
    )]
    pub log_file: bool,

    /// Show debug output
    #[clap(long = "verbose", short = 'v', help = "Show debug output")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[clap(
        long = "quiet",
        short = 'q',
        help = "Only show warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Initialize user configuration directory with settings and a plan
    ///
    /// This creates the ~/.config/fontsieve directory with:
    /// - settings.json: font directory, plan and subsetter overrides
    /// - plan.json: a copy of the built-in plan to edit
    /// - logs/: where --log-file writes
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with settings and a plan",
        long_help = "Initialize the ~/.config/fontsieve directory with a settings.json file, an editable copy of the built-in plan and a logs directory. Existing files are kept."
    )]
    pub new_config: bool,

    /// Print the effective plan and exit
    #[clap(long = "print-plan", help = "Print the effective plan as JSON and exit")]
    pub print_plan: bool,
}

impl CliArgs {
    /// Whether this invocation does its work without content or output paths.
    pub fn is_standalone(&self) -> bool {
        self.new_config || self.print_plan
    }

    /// Validate the CLI arguments after parsing
    ///
    /// Only argument shape is checked here; whether the content directory
    /// exists is the pipeline's call.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_standalone() {
            return Ok(());
        }
        if self.paths.len() != 2 {
            return Err(format!(
                "Expected 2 arguments (CONTENT_DIR OUTPUT_DIR), got {}",
                self.paths.len()
            ));
        }
        if let Some(plan) = &self.plan {
            if !plan.is_file() {
                return Err(format!("Plan file does not exist: {}", plan.display()));
            }
        }
        Ok(())
    }

    pub fn content_dir(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.paths.get(1).map(PathBuf::as_path)
    }

    /// Resolve the font plan from CLI args, config file, or the built-in plan
    ///
    /// Priority order:
    /// 1. CLI argument (--plan, --font-dir)
    /// 2. Config file setting (~/.config/fontsieve/settings.json)
    /// 3. Built-in plan
    pub fn resolve_plan(&self, config: Option<&ConfigFile>) -> Result<FontPlan, PlanError> {
        let plan_path = self
            .plan
            .clone()
            .or_else(|| config.and_then(|c| c.plan.clone()));

        let plan = match plan_path {
            Some(path) => {
                debug!("Using plan from {}", path.display());
                FontPlan::load(&path)?
            }
            None => {
                debug!("Using built-in plan");
                FontPlan::builtin()?
            }
        };

        let font_dir = self
            .font_dir
            .clone()
            .or_else(|| config.and_then(|c| c.font_dir.clone()));
        Ok(match font_dir {
            Some(dir) => {
                debug!("Using font directory {}", dir.display());
                plan.with_font_dir(dir)
            }
            None => plan,
        })
    }
}
