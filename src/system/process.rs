use std::cmp::Ordering;

use serde::Serialize;

/// Upper bound on how many OS-reported process ids one pass considers.
pub const MAX_PROCESSES: usize = 1024;
/// Name buffer size; stored names hold at most `MAX_NAME_LEN - 1` characters.
pub const MAX_NAME_LEN: usize = 256;
/// The ranked view never holds more entries than this.
pub const MAX_TOP_N: usize = 10;
/// Stand-in name when the module name cannot be read.
pub const UNKNOWN_NAME: &str = "<unknown>";
/// Per-process CPU is not measured; every snapshot carries this value.
pub const PLACEHOLDER_CPU_PERCENT: f32 = 0.0;

/// Which field the top-N view is ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Memory,
    Cpu,
    Name,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Memory => SortMode::Cpu,
            SortMode::Cpu => SortMode::Name,
            SortMode::Name => SortMode::Memory,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Memory => "Memory",
            SortMode::Cpu => "CPU",
            SortMode::Name => "Name",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cpu" => SortMode::Cpu,
            "name" => SortMode::Name,
            _ => SortMode::Memory,
        }
    }
}

/// Point-in-time view of one process. Built fresh on every pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessSnapshot {
    pub process_id: u32,
    pub name: String,
    pub memory_usage_kb: u64,
    /// Share of physical memory, 0 when the total is unknown.
    pub memory_percent: f32,
    /// Placeholder, see [`PLACEHOLDER_CPU_PERCENT`].
    pub cpu_usage_percent: f32,
}

impl ProcessSnapshot {
    pub fn new(process_id: u32, name: Option<&str>, memory_bytes: Option<u64>) -> Self {
        ProcessSnapshot {
            process_id,
            name: bounded_name(name),
            memory_usage_kb: memory_bytes.map(|b| b / 1024).unwrap_or(0),
            memory_percent: 0.0,
            cpu_usage_percent: PLACEHOLDER_CPU_PERCENT,
        }
    }

    /// Fills in `memory_percent` against the machine's physical memory.
    pub fn with_memory_share(mut self, total_memory_bytes: Option<u64>) -> Self {
        self.memory_percent = match total_memory_bytes {
            Some(total) if total > 0 => {
                let share = self.memory_usage_kb as f64 * 1024.0 * 100.0 / total as f64;
                share.clamp(0.0, 100.0) as f32
            }
            _ => 0.0,
        };
        self
    }
}

/// Clamps a raw module name to the name buffer, falling back to the sentinel.
pub fn bounded_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.chars().take(MAX_NAME_LEN - 1).collect(),
        _ => UNKNOWN_NAME.to_string(),
    }
}

/// Memory descending, pid ascending on ties.
pub fn compare_memory_usage(a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    b.memory_usage_kb
        .cmp(&a.memory_usage_kb)
        .then_with(|| a.process_id.cmp(&b.process_id))
}

/// CPU descending, then memory order.
pub fn compare_cpu_usage(a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    b.cpu_usage_percent
        .total_cmp(&a.cpu_usage_percent)
        .then_with(|| compare_memory_usage(a, b))
}

/// Case-insensitive name, pid ascending on ties.
pub fn compare_name(a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.process_id.cmp(&b.process_id))
}

/// Sorts by `mode` and keeps at most `top_n` (never more than [`MAX_TOP_N`]).
pub fn rank(
    mut processes: Vec<ProcessSnapshot>,
    mode: SortMode,
    top_n: usize,
) -> Vec<ProcessSnapshot> {
    match mode {
        SortMode::Memory => processes.sort_by(compare_memory_usage),
        SortMode::Cpu => processes.sort_by(compare_cpu_usage),
        SortMode::Name => processes.sort_by(compare_name),
    }
    processes.truncate(top_n.min(MAX_TOP_N));
    processes
}

pub fn rank_by_memory(processes: Vec<ProcessSnapshot>, top_n: usize) -> Vec<ProcessSnapshot> {
    rank(processes, SortMode::Memory, top_n)
}
