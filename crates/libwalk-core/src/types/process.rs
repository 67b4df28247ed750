//! Process and memory-mapping types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process identifier as reported by procfs.
pub type Pid = i32;

/// A process as seen by one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Process ID
    pub pid: Pid,
    /// When the process started (whole seconds)
    pub start_time: DateTime<Utc>,
}

/// One line of a process's memory-mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// First address of the mapping
    pub start: u64,
    /// One past the last address of the mapping
    pub end: u64,
    /// Permission string, e.g. `r-xp`
    pub perms: String,
    /// Offset into the backing file
    pub offset: u64,
    /// Device as `major:minor` (hex)
    pub device: String,
    /// Inode of the backing file
    pub inode: u64,
    /// Backing file, with any ` (deleted)` marker removed
    pub path: PathBuf,
    /// Whether the kernel flagged the backing file as deleted
    pub deleted: bool,
}

impl MapEntry {
    /// Readable and executable, i.e. a code segment.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        let bytes = self.perms.as_bytes();
        bytes.first() == Some(&b'r') && bytes.get(2) == Some(&b'x')
    }
}
