use super::PlatformCounters;
use crate::system::utilization::CpuTimes;

use windows_sys::Win32::Foundation::FILETIME;
use windows_sys::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};
use windows_sys::Win32::System::Threading::GetSystemTimes;

pub struct Platform;

fn filetime_ticks(ft: &FILETIME) -> u64 {
    ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64
}

impl PlatformCounters for Platform {
    fn cpu_times() -> Option<CpuTimes> {
        unsafe {
            let mut idle = std::mem::zeroed::<FILETIME>();
            let mut kernel = std::mem::zeroed::<FILETIME>();
            let mut user = std::mem::zeroed::<FILETIME>();
            if GetSystemTimes(&mut idle, &mut kernel, &mut user) == 0 {
                return None;
            }
            Some(CpuTimes {
                idle: filetime_ticks(&idle),
                kernel: filetime_ticks(&kernel),
                user: filetime_ticks(&user),
            })
        }
    }

    fn memory_load_percent() -> Option<u32> {
        unsafe {
            let mut status = std::mem::zeroed::<MEMORYSTATUSEX>();
            status.dwLength = std::mem::size_of::<MEMORYSTATUSEX>() as u32;
            if GlobalMemoryStatusEx(&mut status) == 0 {
                return None;
            }
            Some(status.dwMemoryLoad)
        }
    }
}
