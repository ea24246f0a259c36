//! Externally-asserted privilege check for system-scope operations.
//!
//! The core never escalates by itself; it only refuses system-scope
//! mutations when this returns false.

use std::fs;

/// True when the process runs with an effective uid of 0.
///
/// Reads `/proc/self/status` (Linux) and falls back to the `USER`
/// environment variable on platforms without procfs.
pub fn is_privileged() -> bool {
    if let Some(euid) = effective_uid_from_procfs() {
        return euid == 0;
    }
    std::env::var("USER").map(|u| u == "root").unwrap_or(false)
}

fn effective_uid_from_procfs() -> Option<u32> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let uid_line = status.lines().find(|line| line.starts_with("Uid:"))?;
    // Uid: real effective saved filesystem
    let euid = uid_line.split_whitespace().nth(2)?;
    euid.parse().ok()
}
