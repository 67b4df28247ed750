//! Core types and traits for libwalk.
//!
//! libwalk finds running processes that still have shared libraries mapped
//! which were replaced or removed on disk after the process started. Such a
//! process is running stale code and should be restarted.
//!
//! This crate holds everything that does not touch the operating system:
//!
//! - **Types**: process info, findings, the parsed mapping-table entry, the
//!   scan report and its exit-status contract
//! - **Errors**: the scan error taxonomy in [`ScanError`]
//! - **Traits**: the seams the evaluator is written against
//!   ([`ProcessEnumerator`], [`ProcessIntrospector`], [`FileFreshnessOracle`])
//!
//! # Example
//!
//! ```rust
//! use libwalk_core::{ScanReport, ExitStatus};
//!
//! let report = ScanReport::default();
//! assert_eq!(report.exit_status(), ExitStatus::Clean);
//! ```

mod error;
pub mod traits;
pub mod types;

pub use error::{Result, ScanError};
pub use traits::{FileFreshnessOracle, ProcessEnumerator, ProcessIntrospector};
pub use types::*;
