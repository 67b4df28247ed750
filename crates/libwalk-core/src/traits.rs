//! Seams between the staleness evaluator and the operating system.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Pid;

/// Lists the processes visible to the caller.
pub trait ProcessEnumerator {
    /// One point-in-time snapshot of process ids, in no particular order.
    ///
    /// Individual processes that vanish while listing are dropped; only a
    /// failure to read the process table as a whole is an error.
    fn list_processes(&self) -> Result<Vec<Pid>>;
}

/// Queries a single process.
pub trait ProcessIntrospector {
    /// When the process started, at whole-second precision.
    ///
    /// Fails with [`ScanError::ProcessGone`](crate::ScanError::ProcessGone)
    /// when the process no longer exists or cannot be queried.
    fn start_time(&self, pid: Pid) -> Result<DateTime<Utc>>;

    /// Absolute paths of the executable file mappings of the process.
    ///
    /// Fails with [`ScanError::AccessDenied`](crate::ScanError::AccessDenied)
    /// when the mapping table is not readable by the caller.
    fn libraries(&self, pid: Pid) -> Result<BTreeSet<PathBuf>>;

    /// Path of the process's executable, if it can be resolved.
    fn executable(&self, pid: Pid) -> Option<PathBuf>;
}

/// Reports when a file was last modified.
pub trait FileFreshnessOracle {
    /// Last modification time, at whole-second precision.
    ///
    /// Fails with [`ScanError::PathNotFound`](crate::ScanError::PathNotFound)
    /// when the file is gone; any other failure is unexpected.
    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>>;
}

impl<T: ProcessEnumerator + ?Sized> ProcessEnumerator for &T {
    fn list_processes(&self) -> Result<Vec<Pid>> {
        (**self).list_processes()
    }
}

impl<T: ProcessIntrospector + ?Sized> ProcessIntrospector for &T {
    fn start_time(&self, pid: Pid) -> Result<DateTime<Utc>> {
        (**self).start_time(pid)
    }

    fn libraries(&self, pid: Pid) -> Result<BTreeSet<PathBuf>> {
        (**self).libraries(pid)
    }

    fn executable(&self, pid: Pid) -> Option<PathBuf> {
        (**self).executable(pid)
    }
}

impl<T: FileFreshnessOracle + ?Sized> FileFreshnessOracle for &T {
    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>> {
        (**self).modified_time(path)
    }
}
