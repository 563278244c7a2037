use super::PlatformCounters;
use crate::system::utilization::CpuTimes;

pub struct Platform;

impl PlatformCounters for Platform {
    fn cpu_times() -> Option<CpuTimes> {
        let contents = std::fs::read_to_string("/proc/stat").ok()?;
        parse_proc_stat(&contents)
    }

    fn memory_load_percent() -> Option<u32> {
        let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
        parse_meminfo(&contents)
    }
}

// Aggregate "cpu" line: user nice system idle iowait irq softirq steal ...
fn parse_proc_stat(contents: &str) -> Option<CpuTimes> {
    let line = contents.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    let sum = |indices: &[usize]| {
        indices
            .iter()
            .map(|&i| fields.get(i).copied().unwrap_or(0))
            .fold(0u64, u64::saturating_add)
    };

    let idle = sum(&[3, 4]);
    let system = sum(&[2, 5, 6]);
    // Steal is time the hypervisor took from us; counted as busy in user.
    let user = sum(&[0, 1, 7]);
    Some(CpuTimes {
        idle,
        kernel: system.saturating_add(idle),
        user,
    })
}

fn parse_meminfo(contents: &str) -> Option<u32> {
    let mut total = None;
    let mut available = None;
    for line in contents.lines() {
        if let Some(val) = line.strip_prefix("MemTotal:") {
            total = parse_kb(val);
        } else if let Some(val) = line.strip_prefix("MemAvailable:") {
            available = parse_kb(val);
        }
    }
    let total = total.filter(|&t| t > 0)?;
    let used = total.saturating_sub(available?);
    Some(((used as f64 / total as f64) * 100.0).round() as u32)
}

fn parse_kb(value: &str) -> Option<u64> {
    value.split_whitespace().next()?.parse().ok()
}
