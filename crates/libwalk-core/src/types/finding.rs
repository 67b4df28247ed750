//! Staleness findings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::process::Pid;

/// Why a process was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// A mapped library was modified after the process started
    ModifiedAfterStart,
    /// A mapped library no longer exists on disk
    LibraryMissing,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModifiedAfterStart => write!(f, "library modified after start"),
            Self::LibraryMissing => write!(f, "library missing"),
        }
    }
}

/// A library that qualified a process as stale (detailed mode only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleLibrary {
    /// Library path as mapped by the process
    pub path: PathBuf,
    /// Why this library qualifies
    pub reason: StaleReason,
    /// Modification time, when the file still exists
    pub modified_at: Option<DateTime<Utc>>,
}

/// A process that should be restarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessFinding {
    /// Process ID
    pub pid: Pid,
    /// Executable of the process, if the link could be read
    pub executable: Option<PathBuf>,
    /// Why the process is stale
    pub reason: StaleReason,
    /// Qualifying libraries; empty unless evaluation ran in detailed mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<StaleLibrary>,
}

impl StalenessFinding {
    /// Executable path for display, `?` when unknown.
    #[must_use]
    pub fn executable_display(&self) -> String {
        self.executable
            .as_ref()
            .map_or_else(|| "?".to_string(), |p| p.display().to_string())
    }
}
