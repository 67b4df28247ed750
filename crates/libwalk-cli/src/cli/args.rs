//! Command-line argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use libwalk_core::Pid;

use crate::config::InitSystemSetting;
use crate::output::OutputFormat;

/// Find running processes that use shared libraries changed since they started
///
/// After a package upgrade, long-running processes keep executing the old
/// library code they mapped at startup. libwalk lists every such process so
/// it can be restarted.
///
/// Exit status: 0 nothing stale, 1 stale processes found, 2 scan failed.
#[derive(Parser, Debug)]
#[command(name = "libwalk")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (default: platform config dir)
    #[arg(short, long, global = true, env = "LIBWALK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan processes for stale libraries (default)
    Scan(ScanArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Self::Scan(ScanArgs::default())
    }
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Only examine these processes (repeatable)
    #[arg(short, long = "pid", value_name = "PID", value_parser = clap::value_parser!(Pid).range(1..))]
    pub pids: Vec<Pid>,

    /// List every stale library of each process instead of stopping at the first
    #[arg(long)]
    pub detailed: bool,

    /// Do not look up service unit names
    #[arg(long)]
    pub no_units: bool,

    /// procfs mount point to read process tables from; library paths are
    /// still checked on this machine's filesystem
    #[arg(long, value_name = "PATH")]
    pub proc_root: Option<PathBuf>,

    /// Init system to assume instead of probing
    #[arg(long, value_enum)]
    pub init_system: Option<InitSystemSetting>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}
