//! libwalk - find processes running stale shared libraries
//!
//! Exits 0 when nothing needs a restart, 1 when at least one process does,
//! and 2 when the scan could not be completed.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match libwalk_cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(libwalk_core::ExitStatus::Failed.code())
        }
    }
}
