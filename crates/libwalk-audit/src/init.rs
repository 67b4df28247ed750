//! Init-system detection.

use std::path::Path;
use tracing::debug;

use libwalk_core::InitSystemKind;

/// Default runtime directory checked for a running systemd.
pub const DEFAULT_RUN_DIR: &str = "/run";

/// Probe which init system manages this host.
///
/// systemd creates `<run>/systemd/system` early in boot, which is the same
/// test `sd_booted(3)` uses. Without it, a readable `<proc>/1/comm` still
/// shows that some other init is running as PID 1.
pub fn probe_init_system(run_dir: &Path, proc_root: &Path) -> InitSystemKind {
    if run_dir.join("systemd").join("system").is_dir() {
        debug!("systemd runtime directory present");
        return InitSystemKind::SystemdClass;
    }

    match std::fs::read_to_string(proc_root.join("1").join("comm")) {
        Ok(comm) => {
            debug!(init = comm.trim(), "non-systemd init");
            InitSystemKind::Other
        }
        Err(e) => {
            debug!(error = %e, "no observable init process");
            InitSystemKind::None
        }
    }
}
