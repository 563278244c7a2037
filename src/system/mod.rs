pub mod error;
pub mod platform;
pub mod process;
pub mod refresh;
pub mod sampler;
pub mod utilization;
