//! Process-level error handling and argument parsing.
//!
//! Everything that decides an exit code lives here.

use crate::core::cli::CliArgs;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

/// Handle application errors: print to stderr and exit with code 1.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("Error: {error:#}");
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

/// Print a usage error and exit with code 1.
pub fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    eprintln!();
    eprintln!("{}", CliArgs::command().render_usage());
    std::process::exit(1);
}

/// Parse and validate command line arguments.
///
/// `--help` and `--version` print and exit 0; any other problem with the
/// arguments exits 1 after printing usage.
pub fn get_cli_args() -> CliArgs {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                std::process::exit(0);
            }
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    if let Err(message) = args.validate() {
        usage_error(&message);
    }
    args
}
