//! Output formatting for scan reports.
//!
//! Pretty output writes one whole line per stale process through a single
//! locked stdout handle; diagnostics and the summary go to stderr so that
//! stdout can be piped.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use libwalk_audit::EvaluationMode;
use libwalk_core::{
    InitSystemKind, ScanFailure, ScanReport, ScanSummary, StaleLibrary, StaleReason,
    StalenessFinding,
};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per stale process
    #[default]
    Pretty,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A finding together with the unit that owns the process, if known.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry<'a> {
    #[serde(flatten)]
    pub finding: &'a StalenessFinding,
    pub unit: Option<String>,
}

/// Machine-readable scan document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub scanned_at: DateTime<Utc>,
    pub init_system: InitSystemKind,
    pub mode: EvaluationMode,
    pub findings: &'a [ReportEntry<'a>],
    pub failures: &'a [ScanFailure],
    pub summary: ScanSummary,
}

/// The restart line for one finding.
pub fn finding_line(entry: &ReportEntry<'_>) -> String {
    let finding = entry.finding;
    let exe = finding.executable_display();
    let mut line = match &entry.unit {
        Some(unit) => format!(
            "{} <{}> of unit {} should be restarted",
            exe.bright_white(),
            finding.pid,
            unit.bright_cyan()
        ),
        None => format!("{} <{}> should be restarted", exe.bright_white(), finding.pid),
    };

    if finding.reason == StaleReason::LibraryMissing {
        line = format!("{line} {}", "(library missing)".yellow());
    }

    line
}

/// Detail line for a qualifying library (detailed mode).
pub fn library_line(lib: &StaleLibrary) -> String {
    let detail = match (lib.reason, lib.modified_at) {
        (StaleReason::LibraryMissing, _) => "missing".bright_red().to_string(),
        (StaleReason::ModifiedAfterStart, Some(at)) => {
            format!("modified {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
                .bright_yellow()
                .to_string()
        }
        (StaleReason::ModifiedAfterStart, None) => "modified".bright_yellow().to_string(),
    };
    format!("    {} ({detail})", lib.path.display())
}

/// Summary line written after a pretty report.
pub fn summary_line(summary: &ScanSummary) -> String {
    let stale = if summary.stale == 0 {
        "no stale processes".bright_green().to_string()
    } else {
        format!("{} stale processes", summary.stale).bright_red().to_string()
    };
    format!(
        "{stale} ({} scanned, {} skipped, {} failed)",
        summary.scanned,
        summary.skipped_gone + summary.skipped_denied,
        summary.failed
    )
}

/// Write a pretty report: findings to `out`, failures and summary to `err`.
pub fn write_pretty(
    out: &mut impl Write,
    err: &mut impl Write,
    report: &ScanReport,
    entries: &[ReportEntry<'_>],
) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", finding_line(entry))?;
        for lib in &entry.finding.libraries {
            writeln!(out, "{}", library_line(lib))?;
        }
    }
    out.flush()?;

    for failure in &report.failures {
        writeln!(
            err,
            "{} pid {}: {}",
            "error:".bright_red().bold(),
            failure.pid,
            failure.message
        )?;
    }
    writeln!(err, "{}", summary_line(&report.summary))?;
    Ok(())
}

/// Print a scan report to stdout/stderr in the chosen format.
pub fn print_report(
    format: OutputFormat,
    report: &ScanReport,
    entries: &[ReportEntry<'_>],
    init_system: InitSystemKind,
    mode: EvaluationMode,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let doc = JsonReport {
                scanned_at: Utc::now(),
                init_system,
                mode,
                findings: entries,
                failures: &report.failures,
                summary: report.summary,
            };
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
        OutputFormat::Pretty => {
            let stdout = io::stdout();
            let stderr = io::stderr();
            write_pretty(&mut stdout.lock(), &mut stderr.lock(), report, entries)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    fn finding(reason: StaleReason, libraries: Vec<StaleLibrary>) -> StalenessFinding {
        StalenessFinding {
            pid: 812,
            executable: Some(PathBuf::from("/usr/sbin/nginx")),
            reason,
            libraries,
        }
    }

    #[test]
    fn test_line_with_unit() {
        plain();
        let f = finding(StaleReason::ModifiedAfterStart, Vec::new());
        let entry = ReportEntry {
            finding: &f,
            unit: Some("nginx.service".into()),
        };
        assert_eq!(
            finding_line(&entry),
            "/usr/sbin/nginx <812> of unit nginx.service should be restarted"
        );
    }

    #[test]
    fn test_line_without_unit() {
        plain();
        let f = finding(StaleReason::LibraryMissing, Vec::new());
        let entry = ReportEntry {
            finding: &f,
            unit: None,
        };
        assert_eq!(
            finding_line(&entry),
            "/usr/sbin/nginx <812> should be restarted (library missing)"
        );
    }

    #[test]
    fn test_pretty_report_layout() {
        plain();
        let f = finding(
            StaleReason::LibraryMissing,
            vec![
                StaleLibrary {
                    path: PathBuf::from("/usr/lib/libssl.so.3"),
                    reason: StaleReason::LibraryMissing,
                    modified_at: None,
                },
                StaleLibrary {
                    path: PathBuf::from("/usr/lib/libc.so.6"),
                    reason: StaleReason::ModifiedAfterStart,
                    modified_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
                },
            ],
        );
        let report = ScanReport {
            findings: vec![f.clone()],
            failures: vec![ScanFailure {
                pid: 9,
                message: "I/O error on /lib/x.so: boom".into(),
            }],
            summary: ScanSummary {
                scanned: 10,
                fresh: 7,
                stale: 1,
                skipped_gone: 1,
                skipped_denied: 0,
                failed: 1,
            },
        };
        let entries = [ReportEntry {
            finding: &f,
            unit: None,
        }];

        let mut out = Vec::new();
        let mut err = Vec::new();
        write_pretty(&mut out, &mut err, &report, &entries).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "/usr/sbin/nginx <812> should be restarted (library missing)\n\
             \x20   /usr/lib/libssl.so.3 (missing)\n\
             \x20   /usr/lib/libc.so.6 (modified 2024-01-02 03:04:05 UTC)\n"
        );
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("error: pid 9: I/O error on /lib/x.so: boom"));
        assert!(err.contains("1 stale processes (10 scanned, 1 skipped, 1 failed)"));
    }

    #[test]
    fn test_json_entry_flattens_finding() {
        let f = finding(StaleReason::ModifiedAfterStart, Vec::new());
        let entry = ReportEntry {
            finding: &f,
            unit: Some("nginx.service".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["pid"], 812);
        assert_eq!(value["reason"], "modified_after_start");
        assert_eq!(value["unit"], "nginx.service");
        assert_eq!(value["executable"], "/usr/sbin/nginx");
    }
}
