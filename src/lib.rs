//! trapmon - threshold monitoring with SNMP trap notifications
//!
//! This library provides the alert lifecycle engine: it samples metrics by
//! running external commands, tracks a Normal/Alerting state per metric and
//! fans warning and clear notifications out to SNMPv2c trap receivers.
//!
//! # Modules
//!
//! - [`alerts`]: Threshold evaluation, alert state and trap dispatch
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Metric domain models
//! - [`error`]: Error types
//! - [`services`]: Sampling, scheduling and shutdown
//! - [`snmp`]: SNMPv2c trap codec and UDP transport

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod snmp;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
