use serde::Serialize;
use tracing::{debug, warn};

use super::error::SamplerError;
use super::platform;

/// Cumulative CPU ticks since boot.
///
/// `kernel` includes idle time, the way `GetSystemTimes` reports it. Readers
/// on other platforms fold idle into kernel so one formula serves all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CpuTimes {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

/// One raw reading of the system counters, as retained between refreshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UtilizationSample {
    pub cpu: CpuTimes,
    pub memory_load_percent: u32,
}

/// Figures handed to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Utilization {
    pub cpu_percent: f64,
    pub memory_load_percent: u32,
}

/// Source of system-wide counters.
pub trait SystemCounters {
    fn cpu_times(&mut self) -> Result<CpuTimes, SamplerError>;
    fn memory_load_percent(&mut self) -> Result<u32, SamplerError>;
}

/// Reads counters from the running OS.
#[derive(Debug, Default)]
pub struct OsCounters;

impl SystemCounters for OsCounters {
    fn cpu_times(&mut self) -> Result<CpuTimes, SamplerError> {
        platform::cpu_times().ok_or_else(|| {
            SamplerError::UtilizationUnavailable("cpu time counters unreadable".to_string())
        })
    }

    fn memory_load_percent(&mut self) -> Result<u32, SamplerError> {
        platform::memory_load_percent().ok_or_else(|| {
            SamplerError::UtilizationUnavailable("memory status unreadable".to_string())
        })
    }
}

/// CPU busy percentage between two counter readings, clamped to `[0, 100]`.
///
/// Counters that went backwards count as zero elapsed time. No elapsed busy
/// time yields 0. Deltas saturate at `u64::MAX`.
pub fn cpu_percent_between(previous: &CpuTimes, current: &CpuTimes) -> f64 {
    let idle = current.idle.saturating_sub(previous.idle);
    let busy = current
        .kernel
        .saturating_sub(previous.kernel)
        .saturating_add(current.user.saturating_sub(previous.user));
    if busy == 0 {
        return 0.0;
    }
    let raw = 100.0 * (1.0 - idle as f64 / busy as f64);
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Owns the one retained counter sample and the last good readings.
#[derive(Debug, Default)]
pub struct UtilizationEstimator {
    /// Empty until the first successful counter read.
    previous: Option<UtilizationSample>,
    current: Utilization,
}

impl UtilizationEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The counters the next delta will be taken against.
    pub fn previous(&self) -> Option<CpuTimes> {
        self.previous.map(|sample| sample.cpu)
    }

    /// Last good readings; unchanged by failed samples.
    pub fn current(&self) -> Utilization {
        self.current
    }

    /// Takes a new reading. CPU and memory are read independently: whichever
    /// half succeeds is applied even when the other fails, and a failure of
    /// either half is reported as `UtilizationUnavailable`.
    pub fn sample<C: SystemCounters>(
        &mut self,
        counters: &mut C,
    ) -> Result<Utilization, SamplerError> {
        let _span = tracing::debug_span!("estimator.sample").entered();
        let mut failure = None;

        let cpu = counters
            .cpu_times()
            .inspect_err(|err| warn!(%err, "keeping last cpu reading"));
        match counters.memory_load_percent() {
            Ok(load) => self.current.memory_load_percent = load.min(100),
            Err(err) => {
                warn!(%err, "keeping last memory reading");
                failure = Some(err);
            }
        }

        match cpu {
            Ok(now) => {
                self.current.cpu_percent = match &self.previous {
                    Some(previous) => cpu_percent_between(&previous.cpu, &now),
                    None => 0.0,
                };
                self.previous = Some(UtilizationSample {
                    cpu: now,
                    memory_load_percent: self.current.memory_load_percent,
                });
            }
            Err(err) => failure = Some(err),
        }

        debug!(
            cpu_percent = self.current.cpu_percent,
            memory_load_percent = self.current.memory_load_percent,
            "utilization sampled"
        );
        match failure {
            Some(err) => Err(err),
            None => Ok(self.current),
        }
    }

    /// The retained sample the next delta is taken against.
    pub fn retained(&self) -> Option<UtilizationSample> {
        self.previous
    }
}
