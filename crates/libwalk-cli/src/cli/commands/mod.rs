//! Command implementations.

pub mod config;
pub mod scan;

use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Loaded configuration
    pub config: Config,

    /// Config file given on the command line, if any
    pub config_path: Option<PathBuf>,
}
