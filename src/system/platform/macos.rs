use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::PlatformCounters;
use crate::system::utilization::CpuTimes;

pub struct Platform;

impl PlatformCounters for Platform {
    #[allow(deprecated)] // libc points at the mach2 crate for these
    fn cpu_times() -> Option<CpuTimes> {
        let mut info = unsafe { std::mem::zeroed::<libc::host_cpu_load_info>() };
        let mut count = libc::HOST_CPU_LOAD_INFO_COUNT;
        let rc = unsafe {
            libc::host_statistics(
                libc::mach_host_self(),
                libc::HOST_CPU_LOAD_INFO,
                &mut info as *mut _ as libc::host_info_t,
                &mut count,
            )
        };
        if rc != libc::KERN_SUCCESS {
            return None;
        }
        let ticks = |state: libc::c_int| info.cpu_ticks[state as usize] as u64;
        let idle = ticks(libc::CPU_STATE_IDLE);
        Some(CpuTimes {
            idle,
            kernel: ticks(libc::CPU_STATE_SYSTEM) + idle,
            user: ticks(libc::CPU_STATE_USER) + ticks(libc::CPU_STATE_NICE),
        })
    }

    fn memory_load_percent() -> Option<u32> {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        let total = sys.total_memory();
        if total == 0 {
            return None;
        }
        Some(((sys.used_memory() as f64 / total as f64) * 100.0).round() as u32)
    }
}
