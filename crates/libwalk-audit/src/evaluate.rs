//! Staleness evaluation -- compare mapped libraries against process start.
//!
//! A process is stale when at least one mapped library was modified strictly
//! after the process started, or no longer exists on disk. Equal timestamps
//! are not stale: both sides come from the same coarse clock and a false
//! positive costs a needless restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use libwalk_core::{
    FileFreshnessOracle, Pid, ProcessInfo, ProcessIntrospector, Result, ScanError, ScanFailure,
    ScanReport, StaleLibrary, StaleReason, StalenessFinding,
};

/// How much of a process's library set is examined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Stop at the first qualifying library; findings carry no library list.
    #[default]
    FirstMatch,
    /// Examine every library and list all qualifying ones in the finding.
    Detailed,
}

/// Why a process was skipped before any library was examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Exited between enumeration and introspection
    ProcessGone,
    /// Mapping table not readable by the caller
    AccessDenied,
}

/// Result of evaluating one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No stale library mapped
    Fresh,
    /// Process should be restarted
    Stale(StalenessFinding),
    /// Process could not be examined; not an error
    Skipped(SkipReason),
}

/// Decides staleness for processes using a process source and a file clock.
#[derive(Debug, Clone)]
pub struct StalenessEvaluator<S, F> {
    source: S,
    oracle: F,
    mode: EvaluationMode,
}

impl<S, F> StalenessEvaluator<S, F>
where
    S: ProcessIntrospector,
    F: FileFreshnessOracle,
{
    /// Evaluator in first-match mode.
    pub const fn new(source: S, oracle: F) -> Self {
        Self {
            source,
            oracle,
            mode: EvaluationMode::FirstMatch,
        }
    }

    /// Use a different evaluation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Evaluate a single process.
    ///
    /// # Errors
    ///
    /// Returns any error other than the expected skip conditions and missing
    /// libraries, e.g. an I/O failure reading a library's metadata.
    pub fn evaluate(&self, pid: Pid) -> Result<Outcome> {
        let start_time = match self.source.start_time(pid) {
            Ok(t) => t,
            Err(e) => return skipped(e),
        };

        let libraries = match self.source.libraries(pid) {
            Ok(libs) => libs,
            Err(e) => return skipped(e),
        };

        let info = ProcessInfo { pid, start_time };
        let mut stale = Vec::new();

        for lib in libraries {
            let Some(found) = self.check_library(&info, lib)? else {
                continue;
            };
            stale.push(found);
            if self.mode == EvaluationMode::FirstMatch {
                break;
            }
        }

        let Some(reason) = overall_reason(&stale) else {
            return Ok(Outcome::Fresh);
        };

        if self.mode == EvaluationMode::FirstMatch {
            stale.clear();
        }

        Ok(Outcome::Stale(StalenessFinding {
            pid,
            executable: self.source.executable(pid),
            reason,
            libraries: stale,
        }))
    }

    /// Check one library against the process start time.
    fn check_library(
        &self,
        info: &ProcessInfo,
        path: std::path::PathBuf,
    ) -> Result<Option<StaleLibrary>> {
        match self.oracle.modified_time(&path) {
            Ok(mtime) if is_newer(mtime, info.start_time) => Ok(Some(StaleLibrary {
                path,
                reason: StaleReason::ModifiedAfterStart,
                modified_at: Some(mtime),
            })),
            Ok(_) => Ok(None),
            Err(ScanError::PathNotFound { .. }) => Ok(Some(StaleLibrary {
                path,
                reason: StaleReason::LibraryMissing,
                modified_at: None,
            })),
            Err(e) => Err(e),
        }
    }

    /// Evaluate every process in `pids`.
    ///
    /// Unexpected errors abort only the affected process; they are logged and
    /// recorded as failures while the scan continues.
    pub fn scan(&self, pids: impl IntoIterator<Item = Pid>) -> ScanReport {
        let mut report = ScanReport::default();

        for pid in pids {
            report.summary.scanned += 1;
            match self.evaluate(pid) {
                Ok(Outcome::Fresh) => report.summary.fresh += 1,
                Ok(Outcome::Stale(finding)) => {
                    debug!(pid, reason = %finding.reason, "stale process");
                    report.summary.stale += 1;
                    report.findings.push(finding);
                }
                Ok(Outcome::Skipped(SkipReason::ProcessGone)) => {
                    debug!(pid, "process gone, skipping");
                    report.summary.skipped_gone += 1;
                }
                Ok(Outcome::Skipped(SkipReason::AccessDenied)) => {
                    debug!(pid, "mappings not readable, skipping");
                    report.summary.skipped_denied += 1;
                }
                Err(e) => {
                    warn!(pid, error = %e, "evaluation failed");
                    report.summary.failed += 1;
                    report.failures.push(ScanFailure {
                        pid,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.findings.sort_by_key(|f| f.pid);
        report.failures.sort_by_key(|f| f.pid);

        info!(
            scanned = report.summary.scanned,
            stale = report.summary.stale,
            failed = report.summary.failed,
            "scan complete"
        );

        report
    }
}

/// Skip conditions become an outcome; anything else stays an error.
fn skipped(err: ScanError) -> Result<Outcome> {
    if !err.is_skip() {
        return Err(err);
    }
    let reason = match err {
        ScanError::AccessDenied { .. } => SkipReason::AccessDenied,
        _ => SkipReason::ProcessGone,
    };
    Ok(Outcome::Skipped(reason))
}

/// Strictly newer; equal timestamps are treated as the loaded version.
fn is_newer(mtime: DateTime<Utc>, start_time: DateTime<Utc>) -> bool {
    mtime > start_time
}

/// Missing libraries outrank modified ones when several qualify.
fn overall_reason(stale: &[StaleLibrary]) -> Option<StaleReason> {
    if stale.is_empty() {
        None
    } else if stale.iter().any(|l| l.reason == StaleReason::LibraryMissing) {
        Some(StaleReason::LibraryMissing)
    } else {
        Some(StaleReason::ModifiedAfterStart)
    }
}
