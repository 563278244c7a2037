use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, trace};

use super::error::SamplerError;
use super::process::{ProcessSnapshot, SortMode, rank};

/// The OS process table: hands out the live pid set and query handles.
pub trait ProcessTable {
    type Handle<'a>: ProcessHandle
    where
        Self: 'a;

    fn process_ids(&mut self) -> Result<Vec<u32>, SamplerError>;

    /// Installed physical memory, when the table knows it.
    fn total_memory_bytes(&mut self) -> Option<u64> {
        None
    }

    /// Opens a query-only handle. The handle is closed when dropped.
    fn open(&self, pid: u32) -> Result<Self::Handle<'_>, SamplerError>;
}

/// Queries against one opened process. Each may fail on its own.
pub trait ProcessHandle {
    fn module_name(&self) -> Result<String, SamplerError>;
    fn working_set_bytes(&self) -> Result<u64, SamplerError>;
}

/// Result of one sampling pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledProcesses {
    /// Ranked by the requested mode, at most `MAX_TOP_N` long.
    pub top: Vec<ProcessSnapshot>,
    /// How many processes were opened and read.
    pub sampled: usize,
}

/// Samples up to `capacity` processes and keeps the `top_n` largest by memory.
pub fn sample_processes<T: ProcessTable>(
    table: &mut T,
    capacity: usize,
    top_n: usize,
) -> Result<SampledProcesses, SamplerError> {
    sample_processes_by(table, capacity, top_n, SortMode::Memory)
}

pub fn sample_processes_by<T: ProcessTable>(
    table: &mut T,
    capacity: usize,
    top_n: usize,
    mode: SortMode,
) -> Result<SampledProcesses, SamplerError> {
    let _span =
        tracing::debug_span!("sampler.sample_processes", capacity, top_n, mode = mode.label())
            .entered();

    let mut pids = table.process_ids()?;
    pids.sort_unstable();
    pids.dedup();
    if pids.len() > capacity {
        debug!(reported = pids.len(), capacity, "truncating process id list");
        pids.truncate(capacity);
    }

    let total_memory = table.total_memory_bytes();
    let mut snapshots = Vec::with_capacity(pids.len());
    for pid in pids {
        match table.open(pid) {
            Ok(handle) => {
                snapshots.push(read_snapshot(pid, handle).with_memory_share(total_memory))
            }
            Err(err) => trace!(pid, %err, "skipping process"),
        }
    }

    let sampled = snapshots.len();
    debug!(sampled, "process sampling complete");
    Ok(SampledProcesses {
        top: rank(snapshots, mode, top_n),
        sampled,
    })
}

// Takes the handle by value so it is closed before the next pid is opened.
fn read_snapshot<H: ProcessHandle>(pid: u32, handle: H) -> ProcessSnapshot {
    let name = handle
        .module_name()
        .inspect_err(|err| trace!(pid, %err, "name unavailable"))
        .ok();
    let memory = handle
        .working_set_bytes()
        .inspect_err(|err| trace!(pid, %err, "memory unavailable"))
        .ok();
    ProcessSnapshot::new(pid, name.as_deref(), memory)
}

/// Process table backed by `sysinfo`.
pub struct SysinfoTable {
    sys: System,
}

impl Default for SysinfoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoTable {
    pub fn new() -> Self {
        SysinfoTable { sys: System::new() }
    }
}

impl ProcessTable for SysinfoTable {
    type Handle<'a>
        = SysinfoHandle<'a>
    where
        Self: 'a;

    fn process_ids(&mut self) -> Result<Vec<u32>, SamplerError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SamplerError::Enumeration(
                "process table is not supported on this platform".to_string(),
            ));
        }
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        // Linux tasks show up as processes; only whole processes are listed.
        Ok(self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, _)| pid.as_u32())
            .collect())
    }

    fn total_memory_bytes(&mut self) -> Option<u64> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        (total > 0).then_some(total)
    }

    fn open(&self, pid: u32) -> Result<SysinfoHandle<'_>, SamplerError> {
        self.sys
            .process(Pid::from_u32(pid))
            .map(|process| SysinfoHandle { pid, process })
            .ok_or(SamplerError::ProcessAccessDenied { pid })
    }
}

pub struct SysinfoHandle<'a> {
    pid: u32,
    process: &'a Process,
}

impl ProcessHandle for SysinfoHandle<'_> {
    fn module_name(&self) -> Result<String, SamplerError> {
        let name = self.process.name().to_string_lossy();
        if name.is_empty() {
            return Err(SamplerError::ProcessQueryFailed {
                pid: self.pid,
                query: "name",
            });
        }
        Ok(name.into_owned())
    }

    fn working_set_bytes(&self) -> Result<u64, SamplerError> {
        Ok(self.process.memory())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::system::process::{MAX_TOP_N, UNKNOWN_NAME};

    #[derive(Clone, Copy)]
    enum Entry {
        Denied,
        Readable {
            name: Option<&'static str>,
            bytes: Option<u64>,
        },
    }

    #[derive(Default)]
    struct FakeTable {
        entries: BTreeMap<u32, Entry>,
        fail_enumeration: bool,
        total_memory: Option<u64>,
        open_handles: Cell<usize>,
        peak_handles: Cell<usize>,
        opened: Cell<usize>,
    }

    impl FakeTable {
        fn with(entries: &[(u32, Entry)]) -> Self {
            FakeTable {
                entries: entries.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    struct FakeHandle<'a> {
        pid: u32,
        name: Option<&'static str>,
        bytes: Option<u64>,
        open_handles: &'a Cell<usize>,
    }

    impl Drop for FakeHandle<'_> {
        fn drop(&mut self) {
            self.open_handles.set(self.open_handles.get() - 1);
        }
    }

    impl ProcessHandle for FakeHandle<'_> {
        fn module_name(&self) -> Result<String, SamplerError> {
            self.name
                .map(str::to_string)
                .ok_or(SamplerError::ProcessQueryFailed {
                    pid: self.pid,
                    query: "name",
                })
        }

        fn working_set_bytes(&self) -> Result<u64, SamplerError> {
            self.bytes.ok_or(SamplerError::ProcessQueryFailed {
                pid: self.pid,
                query: "memory",
            })
        }
    }

    impl ProcessTable for FakeTable {
        type Handle<'a>
            = FakeHandle<'a>
        where
            Self: 'a;

        fn process_ids(&mut self) -> Result<Vec<u32>, SamplerError> {
            if self.fail_enumeration {
                return Err(SamplerError::Enumeration("insufficient buffer".into()));
            }
            // Reverse order to check that sampling does not rely on OS ordering.
            Ok(self.entries.keys().rev().copied().collect())
        }

        fn total_memory_bytes(&mut self) -> Option<u64> {
            self.total_memory
        }

        fn open(&self, pid: u32) -> Result<FakeHandle<'_>, SamplerError> {
            match self.entries.get(&pid) {
                Some(Entry::Readable { name, bytes }) => {
                    self.opened.set(self.opened.get() + 1);
                    let open = self.open_handles.get() + 1;
                    self.open_handles.set(open);
                    self.peak_handles.set(self.peak_handles.get().max(open));
                    Ok(FakeHandle {
                        pid,
                        name: *name,
                        bytes: *bytes,
                        open_handles: &self.open_handles,
                    })
                }
                _ => Err(SamplerError::ProcessAccessDenied { pid }),
            }
        }
    }

    fn readable(name: &'static str, kb: u64) -> Entry {
        Entry::Readable {
            name: Some(name),
            bytes: Some(kb * 1024),
        }
    }

    #[test]
    fn denied_processes_are_skipped() {
        let mut table = FakeTable::with(&[
            (4, Entry::Denied),
            (10, readable("shell", 300)),
            (11, Entry::Denied),
            (12, readable("editor", 900)),
        ]);
        let out = sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(out.sampled, 2);
        let pids: Vec<u32> = out.top.iter().map(|p| p.process_id).collect();
        assert_eq!(pids, vec![12, 10]);
    }

    #[test]
    fn name_failure_keeps_memory() {
        let mut table = FakeTable::with(&[(
            42,
            Entry::Readable {
                name: None,
                bytes: Some(8192),
            },
        )]);
        let out = sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(out.top.len(), 1);
        assert_eq!(out.top[0].name, UNKNOWN_NAME);
        assert_eq!(out.top[0].memory_usage_kb, 8);
    }

    #[test]
    fn memory_failure_keeps_name() {
        let mut table = FakeTable::with(&[(
            7,
            Entry::Readable {
                name: Some("daemon"),
                bytes: None,
            },
        )]);
        let out = sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(out.top[0].name, "daemon");
        assert_eq!(out.top[0].memory_usage_kb, 0);
    }

    #[test]
    fn enumeration_failure_is_surfaced() {
        let mut table = FakeTable::with(&[(1, readable("init", 10))]);
        table.fail_enumeration = true;
        let err = sample_processes(&mut table, 1024, 10).unwrap_err();
        assert!(matches!(err, SamplerError::Enumeration(_)));
    }

    #[test]
    fn empty_table_yields_empty_list() {
        let mut table = FakeTable::default();
        let out = sample_processes(&mut table, 1024, 10).unwrap();
        assert!(out.top.is_empty());
        assert_eq!(out.sampled, 0);
    }

    #[test]
    fn only_one_handle_open_at_a_time() {
        let entries: Vec<(u32, Entry)> =
            (1..=50).map(|pid| (pid, readable("w", pid as u64))).collect();
        let mut table = FakeTable::with(&entries);
        sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(table.peak_handles.get(), 1);
        assert_eq!(table.open_handles.get(), 0);
        assert_eq!(table.opened.get(), 50);
    }

    #[test]
    fn capacity_truncates_considered_pids() {
        let entries: Vec<(u32, Entry)> =
            (1..=40).map(|pid| (pid, readable("w", pid as u64))).collect();
        let mut table = FakeTable::with(&entries);
        let out = sample_processes(&mut table, 16, 10).unwrap();
        assert_eq!(out.sampled, 16);
        assert_eq!(table.opened.get(), 16);
        // Lowest 16 pids were kept, so pid 16 has the most memory.
        assert_eq!(out.top[0].process_id, 16);
        assert_eq!(out.top.len(), MAX_TOP_N);
    }

    #[test]
    fn repeated_passes_are_identical() {
        let mut table = FakeTable::with(&[
            (3, readable("a", 500)),
            (1, readable("b", 500)),
            (2, readable("c", 700)),
            (8, readable("d", 10)),
        ]);
        let first = sample_processes(&mut table, 1024, 10).unwrap();
        let second = sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn memory_share_uses_table_total() {
        let mut table = FakeTable::with(&[(1, readable("db", 256)), (2, readable("sh", 64))]);
        table.total_memory = Some(1024 * 1024);
        let out = sample_processes(&mut table, 1024, 10).unwrap();
        assert_eq!(out.top[0].memory_percent, 25.0);
        assert_eq!(out.top[1].memory_percent, 6.25);
    }

    #[test]
    fn name_mode_ranks_alphabetically() {
        let mut table = FakeTable::with(&[
            (5, readable("vim", 10)),
            (6, readable("Xorg", 900)),
            (7, readable("bash", 20)),
        ]);
        let out = sample_processes_by(&mut table, 1024, 2, SortMode::Name).unwrap();
        let names: Vec<&str> = out.top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "vim"]);
        assert_eq!(out.sampled, 3);
    }

    #[test]
    fn sysinfo_table_lists_current_process() {
        let mut table = SysinfoTable::new();
        let pids = table.process_ids().unwrap();
        let me = std::process::id();
        assert!(pids.contains(&me));
        let handle = table.open(me).unwrap();
        assert!(handle.working_set_bytes().unwrap() > 0);
        drop(handle);
        assert!(table.total_memory_bytes().is_some());
    }
}
