//! Core application functionality
//!
//! Argument handling, exit-code policy and wiring of a run.

pub mod cli;
pub mod platform;
pub mod runner;

// Re-export commonly used items
pub use cli::CliArgs;
pub use runner::run_app;
