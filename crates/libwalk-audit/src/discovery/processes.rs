//! Process enumeration and introspection via the `/proc` filesystem.

use chrono::{DateTime, TimeZone, Utc};
use procfs::process::Process;
use procfs::ProcError;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use libwalk_core::{Pid, ProcessEnumerator, ProcessIntrospector, Result, ScanError};

use super::maps;

/// Default procfs mount point.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Linux process source backed by procfs.
///
/// Boot time and clock ticks are read once at construction; every start
/// time computed by this source is relative to that boot time.
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
    boot_time_secs: u64,
    ticks_per_sec: u64,
}

impl ProcfsSource {
    /// Source for the host's own `/proc`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Enumeration` if the boot time cannot be read.
    pub fn new() -> Result<Self> {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// Source for a procfs mounted at `root`.
    ///
    /// Only the process tables are read from `root`; library paths found in
    /// them are still checked against this machine's filesystem, so `root`
    /// must describe processes sharing that filesystem.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Enumeration` if the boot time cannot be read.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let boot_time_secs =
            procfs::boot_time_secs().map_err(|e| ScanError::Enumeration(e.to_string()))?;
        Ok(Self::with_clock(root, boot_time_secs, procfs::ticks_per_second()))
    }

    /// Source with an explicit boot time and tick rate.
    pub fn with_clock(root: impl Into<PathBuf>, boot_time_secs: u64, ticks_per_sec: u64) -> Self {
        Self {
            root: root.into(),
            boot_time_secs,
            ticks_per_sec: ticks_per_sec.max(1),
        }
    }

    fn process_dir(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string())
    }

    fn process(&self, pid: Pid) -> Result<Process> {
        Process::new_with_root(self.process_dir(pid)).map_err(|e| classify_gone(pid, e))
    }
}

/// Map a procfs error on a per-process query to the scan taxonomy.
fn classify_gone(pid: Pid, err: ProcError) -> ScanError {
    match err {
        ProcError::NotFound(_) | ProcError::PermissionDenied(_) | ProcError::Incomplete(_) => {
            ScanError::ProcessGone { pid }
        }
        ProcError::Io(ref io, _) if io.kind() == ErrorKind::NotFound => {
            ScanError::ProcessGone { pid }
        }
        other => ScanError::Procfs {
            pid,
            reason: other.to_string(),
        },
    }
}

impl ProcessEnumerator for ProcfsSource {
    fn list_processes(&self) -> Result<Vec<Pid>> {
        let all = procfs::process::all_processes_with_root(&self.root)
            .map_err(|e| ScanError::Enumeration(e.to_string()))?;

        let mut pids = Vec::new();
        for entry in all {
            match entry {
                Ok(proc) => pids.push(proc.pid),
                Err(e) => {
                    debug!(error = %e, "skipping vanished process entry");
                }
            }
        }

        Ok(pids)
    }
}

impl ProcessIntrospector for ProcfsSource {
    fn start_time(&self, pid: Pid) -> Result<DateTime<Utc>> {
        let stat = self.process(pid)?.stat().map_err(|e| classify_gone(pid, e))?;

        let start_secs = self.boot_time_secs + stat.starttime / self.ticks_per_sec;
        let start_secs = i64::try_from(start_secs).map_err(|_| ScanError::Procfs {
            pid,
            reason: format!("start time {start_secs} out of range"),
        })?;

        Utc.timestamp_opt(start_secs, 0)
            .single()
            .ok_or_else(|| ScanError::Procfs {
                pid,
                reason: format!("invalid start time {start_secs}"),
            })
    }

    fn libraries(&self, pid: Pid) -> Result<BTreeSet<PathBuf>> {
        let path = self.process_dir(pid).join("maps");
        let content = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => ScanError::AccessDenied { pid },
            ErrorKind::NotFound => ScanError::ProcessGone { pid },
            _ => ScanError::Io { path, source: e },
        })?;

        Ok(maps::library_paths(&content))
    }

    fn executable(&self, pid: Pid) -> Option<PathBuf> {
        std::fs::read_link(self.process_dir(pid).join("exe"))
            .map_err(|e| debug!(pid, error = %e, "cannot resolve executable"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsFreshness, Outcome, StalenessEvaluator};
    use libwalk_core::StaleReason;
    use std::ffi::OsStr;
    use std::fs;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    /// A fake procfs tree with one process.
    fn fake_proc(pid: Pid, maps: Option<&str>) -> TempDir {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        if let Some(maps) = maps {
            fs::write(dir.join("maps"), maps).unwrap();
        }
        root
    }

    /// A 52-field stat line with the given start time in clock ticks.
    fn write_stat(root: &Path, pid: Pid, starttime: u64) {
        fs::write(
            root.join(pid.to_string()).join("stat"),
            format!(
                "{pid} (fake) S 1 {pid} {pid} 0 -1 4194560 1000 0 0 0 10 5 0 0 20 0 1 0 \
                 {starttime} 10000000 500 18446744073709551615 1 1 0 0 0 0 0 4096 0 0 0 0 17 \
                 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n"
            ),
        )
        .unwrap();
    }

    fn set_mtime(path: &Path, at: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    #[test]
    fn test_libraries_from_fake_root() {
        let root = fake_proc(
            4242,
            Some(
                "7f00-7f10 r-xp 00000000 08:01 12 /usr/lib/liba.so\n\
                 7f10-7f20 r--p 00000000 08:01 12 /usr/lib/liba.so\n\
                 7f20-7f30 r-xp 00000000 08:01 13 /usr/lib/libb.so (deleted)\n",
            ),
        );
        let source = ProcfsSource::with_clock(root.path(), 0, 100);

        let libs = source.libraries(4242).unwrap();
        let expected: BTreeSet<PathBuf> = ["/usr/lib/liba.so", "/usr/lib/libb.so"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(libs, expected);
    }

    #[test]
    fn test_non_utf8_library_path_does_not_fail_process() {
        let root = fake_proc(5000, None);
        fs::write(
            root.path().join("5000/maps"),
            b"7f00-7f10 r-xp 00000000 08:01 12 /opt/lib/liba.so\n\
              7f10-7f20 r-xp 00000000 08:01 13 /opt/caf\xe9/libb.so\n",
        )
        .unwrap();
        let source = ProcfsSource::with_clock(root.path(), 0, 100);

        let libs = source.libraries(5000).unwrap();
        let expected: BTreeSet<PathBuf> = [
            PathBuf::from("/opt/lib/liba.so"),
            PathBuf::from(OsStr::from_bytes(b"/opt/caf\xe9/libb.so")),
        ]
        .into_iter()
        .collect();
        assert_eq!(libs, expected);
    }

    #[test]
    fn test_start_time_from_boot_clock() {
        let root = fake_proc(4246, None);
        write_stat(root.path(), 4246, 12345);
        let source = ProcfsSource::with_clock(root.path(), 1_704_067_200, 100);

        let started = source.start_time(4246).unwrap();
        assert_eq!(started, Utc.with_ymd_and_hms(2024, 1, 1, 0, 2, 3).unwrap());
    }

    #[test]
    fn test_start_second_tie_break_end_to_end() {
        let root = fake_proc(4247, None);
        write_stat(root.path(), 4247, 12345);
        let lib = root.path().join("libtie.so.1");
        fs::write(&lib, b"\x7fELF").unwrap();
        fs::write(
            root.path().join("4247/maps"),
            format!("7f00-7f10 r-xp 00000000 08:01 12 {}\n", lib.display()),
        )
        .unwrap();
        let source = ProcfsSource::with_clock(root.path(), 1_704_067_200, 100);
        let evaluator = StalenessEvaluator::new(&source, FsFreshness);
        let started = UNIX_EPOCH + Duration::from_secs(1_704_067_200 + 123);

        set_mtime(&lib, started);
        assert_eq!(evaluator.evaluate(4247).unwrap(), Outcome::Fresh);

        // 123.45s after boot truncates to 123s: same second is fresh
        set_mtime(&lib, started + Duration::from_millis(900));
        assert_eq!(evaluator.evaluate(4247).unwrap(), Outcome::Fresh);

        set_mtime(&lib, started + Duration::from_secs(1));
        match evaluator.evaluate(4247).unwrap() {
            Outcome::Stale(finding) => {
                assert_eq!(finding.reason, StaleReason::ModifiedAfterStart);
            }
            other => panic!("expected stale, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_maps_is_process_gone() {
        let root = fake_proc(4243, None);
        let source = ProcfsSource::with_clock(root.path(), 0, 100);

        let err = source.libraries(4243).unwrap_err();
        assert!(matches!(err, ScanError::ProcessGone { pid: 4243 }));
    }

    #[test]
    fn test_unreadable_maps_is_unexpected_io() {
        // A directory where the maps file should be fails with something
        // other than not-found/permission-denied.
        let root = fake_proc(4244, None);
        fs::create_dir(root.path().join("4244").join("maps")).unwrap();
        let source = ProcfsSource::with_clock(root.path(), 0, 100);

        let err = source.libraries(4244).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(!err.is_skip());
    }

    #[test]
    fn test_executable_unresolvable() {
        let root = fake_proc(4245, None);
        let source = ProcfsSource::with_clock(root.path(), 0, 100);
        assert!(source.executable(4245).is_none());
    }

    #[test]
    fn test_nonexistent_process_is_gone() {
        let root = TempDir::new().unwrap();
        let source = ProcfsSource::with_clock(root.path(), 0, 100);

        let err = source.start_time(999_999).unwrap_err();
        assert!(err.is_skip(), "unexpected error: {err}");
    }

    #[test]
    fn test_own_process_on_live_proc() {
        let source = ProcfsSource::new().unwrap();
        let pid = Pid::try_from(std::process::id()).unwrap();

        let started = source.start_time(pid).unwrap();
        assert!(started <= Utc::now());

        let libs = source.libraries(pid).unwrap();
        assert!(libs.iter().all(|p| p.is_absolute()));

        assert!(source.executable(pid).is_some());
        assert!(source.list_processes().unwrap().contains(&pid));
    }
}
