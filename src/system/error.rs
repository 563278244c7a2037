use thiserror::Error;

/// Failures a single refresh pass can run into. None of them outlive the
/// pass that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    /// The OS refused to hand out the process id list. No process data this cycle.
    #[error("process enumeration failed: {0}")]
    Enumeration(String),

    /// The process could not be opened for querying (protected, or gone).
    #[error("access denied to process {pid}")]
    ProcessAccessDenied { pid: u32 },

    /// A handle was opened but one of its queries failed.
    #[error("{query} query failed for process {pid}")]
    ProcessQueryFailed { pid: u32, query: &'static str },

    /// System-wide counters or memory status could not be read.
    #[error("system utilization unavailable: {0}")]
    UtilizationUnavailable(String),
}
