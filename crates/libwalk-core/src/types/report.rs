//! Scan report -- outcome of one enumeration-and-evaluation pass.

use serde::{Deserialize, Serialize};

use super::finding::StalenessFinding;
use super::process::Pid;

/// A process whose evaluation aborted on an unexpected error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFailure {
    /// Process ID
    pub pid: Pid,
    /// Rendered error
    pub message: String,
}

/// Counters for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Processes handed to the evaluator
    pub scanned: usize,
    /// Processes with no stale library
    pub fresh: usize,
    /// Processes with a finding
    pub stale: usize,
    /// Processes that exited before they could be examined
    pub skipped_gone: usize,
    /// Processes whose mappings could not be read
    pub skipped_denied: usize,
    /// Processes aborted by an unexpected error
    pub failed: usize,
}

/// Process exit contract for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// No stale processes found
    Clean,
    /// One or more stale processes found
    Stale,
    /// The scan hit an unexpected failure
    Failed,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Stale => 1,
            Self::Failed => 2,
        }
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Stale processes, ordered by pid
    pub findings: Vec<StalenessFinding>,
    /// Processes that could not be evaluated
    pub failures: Vec<ScanFailure>,
    /// Counters
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Exit status for this report. Failures win over findings, since an
    /// incomplete scan cannot vouch for the processes it missed.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        if !self.failures.is_empty() {
            ExitStatus::Failed
        } else if !self.findings.is_empty() {
            ExitStatus::Stale
        } else {
            ExitStatus::Clean
        }
    }
}
