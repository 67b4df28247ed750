//! File modification times from the local filesystem.

use chrono::{DateTime, SubsecRound, Utc};
use std::path::Path;

use libwalk_core::{FileFreshnessOracle, Result, ScanError};

/// Reads modification times with `stat(2)`, following symlinks the same
/// way the dynamic loader did when it mapped the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFreshness;

impl FileFreshnessOracle for FsFreshness {
    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>> {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| ScanError::io(path, e))?;

        // Process start times only have whole-second precision.
        Ok(DateTime::<Utc>::from(modified).trunc_subsecs(0))
    }
}
