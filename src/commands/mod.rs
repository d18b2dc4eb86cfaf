//! Command handlers
//!
//! Each command handler orchestrates one mode of the binary.

pub mod monitor;
pub mod receive;

pub use monitor::{build_monitor, run_monitor};
pub use receive::{receive_until, run_receive};
