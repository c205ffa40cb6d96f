//! Application runner logic
//!
//! Wires configuration, logging and the production engine into one
//! pipeline run.

use crate::config::ConfigFile;
use crate::core::cli::CliArgs;
use crate::engine::pyftsubset::PyftsubsetEngine;
use crate::logging::{self, Verbosity};
use crate::pipeline::{self, RunReport};
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

/// Run fontsieve with the given CLI arguments.
/// Handles special CLI flags and delegates the run to the pipeline.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    // Handle --new-config flag specially
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    let _log_guard = logging::init(
        Verbosity::from_flags(cli_args.verbose, cli_args.quiet),
        cli_args.log_file,
    )?;

    let config = ConfigFile::load();
    let plan = cli_args.resolve_plan(config.as_ref())?;

    if cli_args.print_plan {
        println!("{}", plan.to_json_pretty()?);
        return Ok(());
    }

    let (Some(content_dir), Some(output_dir)) = (cli_args.content_dir(), cli_args.output_dir())
    else {
        return Err(anyhow!("Expected CONTENT_DIR and OUTPUT_DIR"));
    };

    let engine = match config.as_ref().and_then(|c| c.subsetter.clone()) {
        Some(program) => {
            debug!("Using subsetter {}", program.display());
            PyftsubsetEngine::with_program(program)
        }
        None => PyftsubsetEngine::new(),
    };
    info!("Font directory: {}", plan.font_dir.display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async {
        let report = pipeline::run(&engine, &plan, content_dir, output_dir).await?;
        if let Some(path) = &cli_args.report {
            write_report(&report, path).await;
        }
        Ok::<(), anyhow::Error>(())
    })
}

async fn write_report(report: &RunReport, path: &std::path::Path) {
    match report.write_json(path).await {
        Ok(()) => info!("Report written to {}", path.display()),
        Err(e) => warn!("Failed to write report {}: {:#}", path.display(), e),
    }
}
