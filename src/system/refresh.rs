use serde::Serialize;
use tracing::warn;

use super::error::SamplerError;
use super::process::{MAX_PROCESSES, MAX_TOP_N, ProcessSnapshot, SortMode};
use super::sampler::{ProcessTable, SysinfoTable, sample_processes_by};
use super::utilization::{OsCounters, SystemCounters, Utilization, UtilizationEstimator};

/// Everything one refresh produced, as plain data for rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    /// Empty when enumeration failed this cycle.
    pub processes: Vec<ProcessSnapshot>,
    pub sort_mode: SortMode,
    pub sampled: usize,
    pub utilization: Utilization,
    #[serde(serialize_with = "error_text")]
    pub process_error: Option<SamplerError>,
    #[serde(serialize_with = "error_text")]
    pub utilization_error: Option<SamplerError>,
}

fn error_text<S: serde::Serializer>(
    err: &Option<SamplerError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match err {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Composes the process sampler and the utilization estimator.
pub struct Refresher<T = SysinfoTable, C = OsCounters> {
    table: T,
    counters: C,
    estimator: UtilizationEstimator,
    capacity: usize,
    top_n: usize,
    sort_mode: SortMode,
}

impl Refresher {
    /// Backed by the running OS.
    pub fn system(capacity: usize, top_n: usize) -> Self {
        Refresher::new(SysinfoTable::new(), OsCounters, capacity, top_n)
    }
}

impl<T: ProcessTable, C: SystemCounters> Refresher<T, C> {
    pub fn new(table: T, counters: C, capacity: usize, top_n: usize) -> Self {
        Refresher {
            table,
            counters,
            estimator: UtilizationEstimator::new(),
            capacity: capacity.clamp(1, MAX_PROCESSES),
            top_n: top_n.clamp(1, MAX_TOP_N),
            sort_mode: SortMode::Memory,
        }
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Takes effect on the next refresh.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn estimator(&self) -> &UtilizationEstimator {
        &self.estimator
    }

    pub fn refresh(&mut self) -> RefreshReport {
        let _span = tracing::debug_span!("refresher.refresh").entered();

        let (processes, sampled, process_error) =
            match sample_processes_by(&mut self.table, self.capacity, self.top_n, self.sort_mode) {
                Ok(out) => (out.top, out.sampled, None),
                Err(err) => {
                    warn!(%err, "no process data this cycle");
                    (Vec::new(), 0, Some(err))
                }
            };

        let utilization_error = self.estimator.sample(&mut self.counters).err();

        RefreshReport {
            processes,
            sort_mode: self.sort_mode,
            sampled,
            utilization: self.estimator.current(),
            process_error,
            utilization_error,
        }
    }
}
