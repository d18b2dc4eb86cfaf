//! Service layer for metric monitoring
//!
//! Services encapsulate sampling, the periodic monitoring loop and the
//! shutdown signal that stops it.

pub mod monitor;
pub mod sampler;
pub mod shutdown;

pub use monitor::{CycleReport, Monitor, MonitorConfig};
pub use sampler::{CommandSampler, MetricSampler};
pub use shutdown::ShutdownToken;
