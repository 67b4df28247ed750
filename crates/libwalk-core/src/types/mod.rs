//! Core types for stale-library detection.

pub mod finding;
pub mod init;
pub mod process;
pub mod report;

pub use finding::{StaleLibrary, StaleReason, StalenessFinding};
pub use init::InitSystemKind;
pub use process::{MapEntry, Pid, ProcessInfo};
pub use report::{ExitStatus, ScanFailure, ScanReport, ScanSummary};
