//! # libwalk-cli
//!
//! Command-line front end for libwalk.
//!
//! ## Features
//!
//! - **Scan**: report every process with a library upgraded or removed
//!   since it started
//! - **Unit names**: on systemd hosts, name the unit owning each process
//! - **Output formats**: one line per process, or a JSON document
//! - **Exit codes**: 0 clean, 1 stale processes found, 2 scan failure

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
