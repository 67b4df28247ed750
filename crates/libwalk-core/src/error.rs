use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Pid;

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while scanning processes for stale libraries
#[derive(Error, Debug)]
pub enum ScanError {
    /// Process exited (or cannot be queried) between enumeration and introspection
    #[error("process {pid} is gone")]
    ProcessGone {
        /// Process that vanished
        pid: Pid,
    },

    /// Caller may not read the process's mapping table
    #[error("access denied to mappings of process {pid}")]
    AccessDenied {
        /// Process owned by someone else
        pid: Pid,
    },

    /// Mapped library no longer exists on disk
    #[error("path not found: {}", path.display())]
    PathNotFound {
        /// Library path as recorded in the mapping table
        path: PathBuf,
    },

    /// Unexpected I/O failure on a path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Unexpected procfs failure for a single process
    #[error("procfs error for process {pid}: {reason}")]
    Procfs {
        /// Process being introspected
        pid: Pid,
        /// Error reported by procfs
        reason: String,
    },

    /// The process table itself could not be listed
    #[error("cannot enumerate processes: {0}")]
    Enumeration(String),

    /// Init-system unit lookup failed
    #[error("unit lookup for process {pid} failed: {reason}")]
    UnitLookup {
        /// Process whose unit was requested
        pid: Pid,
        /// What went wrong
        reason: String,
    },
}

impl ScanError {
    /// Wrap an I/O error for `path`, classifying "not found" as [`ScanError::PathNotFound`].
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::PathNotFound { path }
        } else {
            Self::Io { path, source: err }
        }
    }

    /// Returns true if the process should be skipped silently
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::ProcessGone { .. } | Self::AccessDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_classifies_not_found() {
        let err = ScanError::io("/lib/gone.so", Error::from(ErrorKind::NotFound));
        assert!(matches!(err, ScanError::PathNotFound { ref path } if path == Path::new("/lib/gone.so")));
        assert!(!err.is_skip());
    }

    #[test]
    fn test_io_keeps_other_errors() {
        let err = ScanError::io("/lib/a.so", Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(!err.is_skip());
        assert!(err.to_string().starts_with("I/O error on /lib/a.so"));
    }

    #[test]
    fn test_skip_conditions() {
        assert!(ScanError::ProcessGone { pid: 1 }.is_skip());
        assert!(ScanError::AccessDenied { pid: 1 }.is_skip());
        assert!(!ScanError::Enumeration("boom".into()).is_skip());
        assert!(!ScanError::Procfs {
            pid: 7,
            reason: "bad stat".into()
        }
        .is_skip());
    }
}
