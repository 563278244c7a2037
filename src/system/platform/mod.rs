use crate::system::utilization::CpuTimes;

pub trait PlatformCounters {
    /// Cumulative idle/kernel/user ticks, kernel including idle.
    fn cpu_times() -> Option<CpuTimes>;
    /// Share of physical memory in use, 0-100.
    fn memory_load_percent() -> Option<u32>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_times() -> Option<CpuTimes> {
    platform_impl::Platform::cpu_times()
}

pub fn memory_load_percent() -> Option<u32> {
    platform_impl::Platform::memory_load_percent()
}
