//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Flag wins over config file
    let output_format = cli.output.or(config.output_format).unwrap_or_default();

    let ctx = commands::Context {
        output_format,
        config,
        config_path: cli.config,
    };

    match cli.command.unwrap_or_default() {
        Commands::Scan(args) => commands::scan::execute(ctx, args).await,
        Commands::Config(args) => {
            commands::config::execute(ctx, args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .ok();
}
