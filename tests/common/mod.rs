#![allow(dead_code)]

use std::collections::BTreeMap;

use proctop::system::error::SamplerError;
use proctop::system::sampler::{ProcessHandle, ProcessTable};
use proctop::system::utilization::{CpuTimes, SystemCounters};

#[derive(Clone, Copy, Debug)]
pub enum MockProcess {
    Denied,
    Open {
        name: Option<&'static str>,
        bytes: Option<u64>,
    },
}

pub fn open(name: &'static str, kb: u64) -> MockProcess {
    MockProcess::Open {
        name: Some(name),
        bytes: Some(kb * 1024),
    }
}

#[derive(Debug, Default)]
pub struct MockTable {
    pub processes: BTreeMap<u32, MockProcess>,
    pub fail_enumeration: bool,
    pub total_memory_bytes: Option<u64>,
}

impl MockTable {
    pub fn new(processes: impl IntoIterator<Item = (u32, MockProcess)>) -> Self {
        MockTable {
            processes: processes.into_iter().collect(),
            fail_enumeration: false,
            total_memory_bytes: None,
        }
    }
}

pub struct MockHandle {
    pid: u32,
    name: Option<&'static str>,
    bytes: Option<u64>,
}

impl ProcessHandle for MockHandle {
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

impl ProcessTable for MockTable {
    type Handle<'a>
        = MockHandle
    where
        Self: 'a;

    fn process_ids(&mut self) -> Result<Vec<u32>, SamplerError> {
        if self.fail_enumeration {
            return Err(SamplerError::Enumeration("mock failure".into()));
        }
        Ok(self.processes.keys().copied().collect())
    }

    fn total_memory_bytes(&mut self) -> Option<u64> {
        self.total_memory_bytes
    }

    fn open(&self, pid: u32) -> Result<MockHandle, SamplerError> {
        match self.processes.get(&pid) {
            Some(MockProcess::Open { name, bytes }) => Ok(MockHandle {
                pid,
                name: *name,
                bytes: *bytes,
            }),
            _ => Err(SamplerError::ProcessAccessDenied { pid }),
        }
    }
}

/// Replays a fixed list of readings; `None` entries fail.
pub struct ReplayCounters {
    pub cpu: Vec<Option<CpuTimes>>,
    pub memory: Vec<Option<u32>>,
    cpu_pos: usize,
    memory_pos: usize,
}

impl ReplayCounters {
    pub fn new(cpu: Vec<Option<CpuTimes>>, memory: Vec<Option<u32>>) -> Self {
        ReplayCounters {
            cpu,
            memory,
            cpu_pos: 0,
            memory_pos: 0,
        }
    }
}

impl SystemCounters for ReplayCounters {
    fn cpu_times(&mut self) -> Result<CpuTimes, SamplerError> {
        let reading = self.cpu.get(self.cpu_pos).copied().flatten();
        self.cpu_pos += 1;
        reading.ok_or_else(|| SamplerError::UtilizationUnavailable("replay cpu".into()))
    }

    fn memory_load_percent(&mut self) -> Result<u32, SamplerError> {
        let reading = self.memory.get(self.memory_pos).copied().flatten();
        self.memory_pos += 1;
        reading.ok_or_else(|| SamplerError::UtilizationUnavailable("replay memory".into()))
    }
}
