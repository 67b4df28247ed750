//! `libwalk config` - inspect CLI configuration.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Path => show_path(&ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Current Configuration:".bold());
    println!();

    println!(
        "  {} {}",
        "output_format:".bold(),
        config.output_format.unwrap_or_default()
    );
    println!("  {} {}", "resolve_units:".bold(), config.resolve_units);
    println!("  {} {:?}", "init_system:".bold(), config.init_system);
    println!(
        "  {} {}",
        "unit_lookup_timeout_secs:".bold(),
        config.unit_lookup_timeout_secs
    );
    let proc_root = config.proc_root.as_ref().map_or_else(
        || "(default /proc)".dimmed().to_string(),
        |p| p.display().to_string(),
    );
    println!("  {} {}", "proc_root:".bold(), proc_root);
    println!("  {} {}", "detailed:".bold(), config.detailed);

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    println!("{}", path.display());
    Ok(())
}
