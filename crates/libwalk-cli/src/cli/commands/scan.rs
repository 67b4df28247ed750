//! `libwalk scan` - find processes that need a restart.

use anyhow::{Context as _, Result};
use futures_util::{stream, StreamExt};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use libwalk_audit::{
    EvaluationMode, ProcfsSource, ScanOptions, UnitResolver, DEFAULT_PROC_ROOT, DEFAULT_RUN_DIR,
};
use libwalk_core::ScanReport;

use super::Context;
use crate::cli::args::ScanArgs;
use crate::output::{self, ReportEntry};

/// Concurrent `systemctl` invocations while naming units.
const UNIT_LOOKUP_CONCURRENCY: usize = 8;

/// Execute the scan command.
pub async fn execute(ctx: Context, args: ScanArgs) -> Result<ExitCode> {
    let proc_root = args
        .proc_root
        .or_else(|| ctx.config.proc_root.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT));

    let mode = if args.detailed || ctx.config.detailed {
        EvaluationMode::Detailed
    } else {
        EvaluationMode::FirstMatch
    };

    // Decided once, before any finding is reported.
    let init_system = args
        .init_system
        .unwrap_or(ctx.config.init_system)
        .resolve(Path::new(DEFAULT_RUN_DIR), &proc_root);
    info!(%init_system, "init system");

    let source = ProcfsSource::with_root(&proc_root)
        .with_context(|| format!("cannot read process table at {}", proc_root.display()))?;

    let options = ScanOptions {
        pids: (!args.pids.is_empty()).then_some(args.pids),
        mode,
    };
    let report = libwalk_audit::scan(&source, &options)
        .with_context(|| format!("cannot enumerate processes in {}", proc_root.display()))?;

    let resolve = init_system.has_units() && ctx.config.resolve_units && !args.no_units;
    let units = if resolve {
        let timeout = Duration::from_secs(ctx.config.unit_lookup_timeout_secs);
        resolve_units(&report, &UnitResolver::new(timeout)).await
    } else {
        vec![None; report.findings.len()]
    };

    let entries: Vec<ReportEntry<'_>> = report
        .findings
        .iter()
        .zip(units)
        .map(|(finding, unit)| ReportEntry { finding, unit })
        .collect();

    output::print_report(ctx.output_format, &report, &entries, init_system, mode)?;

    Ok(exit_code(&report))
}

/// Unit name per finding, in finding order. Failed lookups are `None`.
async fn resolve_units(report: &ScanReport, resolver: &UnitResolver) -> Vec<Option<String>> {
    stream::iter(report.findings.iter().map(move |f| resolver.unit_for(f.pid)))
        .buffered(UNIT_LOOKUP_CONCURRENCY)
        .collect()
        .await
}

fn exit_code(report: &ScanReport) -> ExitCode {
    ExitCode::from(report.exit_status().code())
}

