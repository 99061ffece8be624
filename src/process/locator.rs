//! Resolving the target process identifier.

use crate::core::ReloadTarget;
use crate::error::{ReloaderError, Result};
use std::fs;
use std::path::Path;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::info;

/// One row of a process table snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Process identifier
    pub pid: i32,
    /// Executable name as reported by the OS
    pub name: String,
}

impl ProcessEntry {
    /// Create a new entry.
    pub fn new(pid: i32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// A facility that lists live processes.
///
/// Implementations return a fresh snapshot on every call; the order of the
/// returned entries is the enumeration order used for name matching.
pub trait ProcessTable: Send + Sync {
    /// Take a snapshot of the live process table.
    ///
    /// # Errors
    ///
    /// Returns `ReloaderError::ProcessListFailure` if enumeration fails.
    fn snapshot(&self) -> Result<Vec<ProcessEntry>>;
}

/// The OS process table, read through `sysinfo`.
///
/// Entries are sorted by ascending PID and threads are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl ProcessTable for SystemProcessTable {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReloaderError::ProcessListFailure(
                "process enumeration is not supported on this platform".to_string(),
            ));
        }

        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let mut entries: Vec<ProcessEntry> = system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                ProcessEntry::new(
                    pid.as_u32() as i32,
                    process.name().to_string_lossy().into_owned(),
                )
            })
            .collect();
        entries.sort_by_key(|entry| entry.pid);

        Ok(entries)
    }
}

/// Resolves a `ReloadTarget` to a PID.
///
/// Nothing is cached: every call re-reads the PID file or re-enumerates the
/// process table, so a restarted target is picked up on the next reload.
///
/// # Examples
///
/// ```rust,no_run
/// use config_reloader::core::ReloadTarget;
/// use config_reloader::process::ProcessLocator;
///
/// let locator = ProcessLocator::new();
/// let pid = locator.locate(&ReloadTarget::ByName("nginx".into()))?;
/// println!("nginx runs as {}", pid);
/// # Ok::<(), config_reloader::error::ReloaderError>(())
/// ```
pub struct ProcessLocator<T = SystemProcessTable> {
    table: T,
}

impl ProcessLocator<SystemProcessTable> {
    /// Create a locator backed by the OS process table.
    pub fn new() -> Self {
        Self {
            table: SystemProcessTable,
        }
    }
}

impl Default for ProcessLocator<SystemProcessTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ProcessTable> ProcessLocator<T> {
    /// Create a locator backed by a custom process table.
    pub fn with_table(table: T) -> Self {
        Self { table }
    }

    /// Resolve the target to a PID.
    ///
    /// # Errors
    ///
    /// - `InvalidPidFile` if the PID file is unreadable, empty or malformed
    /// - `ProcessNotFound` if no process has the requested name
    /// - `ProcessListFailure` if the process table cannot be read
    pub fn locate(&self, target: &ReloadTarget) -> Result<i32> {
        match target {
            ReloadTarget::ByPidFile(path) => pid_from_file(path),
            ReloadTarget::ByName(name) => self.find_by_name(name),
        }
    }

    fn find_by_name(&self, name: &str) -> Result<i32> {
        let entry = self
            .table
            .snapshot()?
            .into_iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ReloaderError::ProcessNotFound(name.to_string()))?;

        info!("found executable {} (pid: {})", entry.name, entry.pid);
        Ok(entry.pid)
    }
}

/// Read a PID from a file.
///
/// The whole file is read, surrounding whitespace trimmed, and the rest
/// parsed as a positive base-10 integer.
///
/// # Errors
///
/// Returns `ReloaderError::InvalidPidFile` if the file is unreadable, empty
/// after trimming, or does not hold a positive integer.
pub fn pid_from_file(path: &Path) -> Result<i32> {
    let content = fs::read_to_string(path)
        .map_err(|e| ReloaderError::invalid_pid_file(path, format!("failed to read: {}", e)))?;

    parse_pid(&content).map_err(|reason| ReloaderError::invalid_pid_file(path, reason))
}

fn parse_pid(content: &str) -> std::result::Result<i32, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("file is empty".to_string());
    }

    let pid: i32 = trimmed
        .parse()
        .map_err(|e| format!("{:?} is not a valid integer: {}", trimmed, e))?;

    // 0 and negative values address process groups in kill(2)
    if pid <= 0 {
        return Err(format!(
            "{} is not a process id, refusing to signal a process group",
            pid
        ));
    }

    Ok(pid)
}
