//! Parser for `/proc/<pid>/maps`.
//!
//! Each line has the fixed field order
//! `start-end perms offset major:minor inode [path]`, where the path may be
//! followed by ` (deleted)` when the backing file was unlinked after it was
//! mapped. Deleted entries are kept: a deleted-but-mapped library is exactly
//! what the evaluator is looking for.

use regex::bytes::Regex;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::OnceLock;

use libwalk_core::MapEntry;

fn map_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?-u)^([0-9a-f]+)-([0-9a-f]+) ([r-][w-][x-][ps]) ([0-9a-f]+) ([0-9a-f]+:[0-9a-f]+) (\d+)\s+(/.*?)( \(deleted\))?$",
        )
        .expect("valid maps pattern")
    })
}

/// Parse a single mapping line. Anonymous, `[heap]`-style and malformed
/// lines yield `None`.
///
/// The kernel writes paths as raw bytes, so the path is taken verbatim and
/// need not be UTF-8.
#[must_use]
pub fn parse_line(line: &[u8]) -> Option<MapEntry> {
    let caps = map_line().captures(line)?;

    let text = |i: usize| std::str::from_utf8(&caps[i]).ok();
    let hex = |i: usize| u64::from_str_radix(text(i)?, 16).ok();

    Some(MapEntry {
        start: hex(1)?,
        end: hex(2)?,
        perms: text(3)?.to_string(),
        offset: hex(4)?,
        device: text(5)?.to_string(),
        inode: text(6)?.parse().ok()?,
        path: PathBuf::from(OsStr::from_bytes(&caps[7])),
        deleted: caps.get(8).is_some(),
    })
}

/// Parse every file-backed mapping in a maps table.
#[must_use]
pub fn parse_maps(content: &[u8]) -> Vec<MapEntry> {
    content
        .split(|&b| b == b'\n')
        .filter_map(parse_line)
        .collect()
}

/// Deduplicated paths of the readable+executable file mappings.
#[must_use]
pub fn library_paths(content: &[u8]) -> BTreeSet<PathBuf> {
    parse_maps(content)
        .into_iter()
        .filter(MapEntry::is_executable)
        .map(|entry| entry.path)
        .collect()
}
