//! Unit-name lookup through `systemctl`.
//!
//! Lookups are best effort: any failure is logged and yields `None`, so a
//! finding is always reported even when its unit cannot be named.

use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use libwalk_core::{Pid, Result, ScanError};

/// Default upper bound for a single `systemctl` invocation.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the systemd unit owning a process.
#[derive(Debug, Clone)]
pub struct UnitResolver {
    program: String,
    timeout: Duration,
}

impl Default for UnitResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}

impl UnitResolver {
    /// Resolver using `systemctl` from `PATH`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: String::from("systemctl"),
            timeout,
        }
    }

    /// Use a different `systemctl` binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Unit name for `pid`, or `None` if it cannot be determined.
    pub async fn unit_for(&self, pid: Pid) -> Option<String> {
        match self.lookup(pid).await {
            Ok(unit) => Some(unit),
            Err(e) => {
                debug!(pid, error = %e, "unit lookup failed");
                None
            }
        }
    }

    /// Unit name for `pid`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::UnitLookup` if `systemctl` cannot be run, times
    /// out, or prints nothing recognizable.
    pub async fn lookup(&self, pid: Pid) -> Result<String> {
        let fail = |reason: String| ScanError::UnitLookup { pid, reason };

        let output = Command::new(&self.program)
            .args(["status", "--no-pager", "--lines=0"])
            .arg(pid.to_string())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| fail(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| fail(format!("cannot run {}: {e}", self.program)))?;

        // Inactive/failed units exit non-zero but still print their header.
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_unit_name(&stdout).ok_or_else(|| {
            fail(format!(
                "unrecognized output (exit status {})",
                output.status
            ))
        })
    }
}

/// Extract the unit name from `systemctl status` output.
///
/// The first line reads `● name.service - Description`; the leading glyph
/// varies with the unit state and may be absent.
pub fn parse_unit_name(output: &str) -> Option<String> {
    let header = output.lines().next()?;
    let name_part = header.split(" - ").next()?;
    name_part
        .split_whitespace()
        .find(|token| token.chars().any(char::is_alphanumeric))
        .map(str::to_string)
}
