//! fontsieve
pub mod config;
pub mod core;
pub mod coverage;
pub mod engine;
pub mod logging;
pub mod pipeline;
pub mod reconcile;
pub mod scan;
pub mod subset;
