//! # libwalk-audit
//!
//! Finds processes that still run code from shared libraries which were
//! upgraded or removed on disk after the process started.
//!
//! ## Data Flow
//!
//! ```text
//! ProcfsSource::list_processes()
//!   -> per pid: start_time() + libraries()        (/proc/<pid>/stat, maps)
//!   -> StalenessEvaluator  <->  FsFreshness        (stat(2) mtime)
//!   -> ScanReport { findings, failures, summary }
//!   -> reporting layer (unit names via UnitResolver on systemd hosts)
//! ```
//!
//! Processes that exit mid-scan or belong to other users are skipped
//! silently. A missing library counts as a finding. Any other I/O failure
//! aborts that one process and is recorded in the report.

pub mod discovery;
pub mod evaluate;
pub mod freshness;
pub mod init;
pub mod units;

pub use discovery::{ProcfsSource, DEFAULT_PROC_ROOT};
pub use evaluate::{EvaluationMode, Outcome, SkipReason, StalenessEvaluator};
pub use freshness::FsFreshness;
pub use init::{probe_init_system, DEFAULT_RUN_DIR};
pub use units::{parse_unit_name, UnitResolver, DEFAULT_LOOKUP_TIMEOUT};

use libwalk_core::{Pid, ProcessEnumerator, ProcessIntrospector, Result, ScanReport};

/// What to scan and how.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Restrict the scan to these processes instead of enumerating all
    pub pids: Option<Vec<Pid>>,
    /// Evaluation mode
    pub mode: EvaluationMode,
}

/// Scan the processes visible through `source`.
///
/// # Errors
///
/// Returns `ScanError::Enumeration` if the process table cannot be listed.
/// Per-process failures never fail the scan; they are recorded in the report.
pub fn scan<S>(source: &S, options: &ScanOptions) -> Result<ScanReport>
where
    S: ProcessEnumerator + ProcessIntrospector,
{
    let pids = match &options.pids {
        Some(pids) => pids.clone(),
        None => source.list_processes()?,
    };

    let evaluator = StalenessEvaluator::new(source, FsFreshness).with_mode(options.mode);
    Ok(evaluator.scan(pids))
}
