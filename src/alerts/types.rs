//! Alert system domain types
//!
//! Defines the alert states, the emission policy and the notifications the
//! engine produces.

use crate::snmp::Oid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Per-metric alert state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlertState {
    /// At or below threshold (cold start assumes this)
    #[default]
    Normal,
    /// Above threshold, warning has been raised
    Alerting,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Alerting => write!(f, "ALERTING"),
        }
    }
}

/// When warnings are emitted while a metric stays above threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPolicy {
    /// Warn once on Normal -> Alerting, clear once on Alerting -> Normal
    #[default]
    Edge,
    /// Warn on every cycle above threshold, clear once on recovery
    Repeat,
}

impl fmt::Display for AlertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge => write!(f, "edge"),
            Self::Repeat => write!(f, "repeat"),
        }
    }
}

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Warning,
    Clear,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Clear => write!(f, "CLEAR"),
        }
    }
}

/// Result of feeding one verdict to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AlertState,
    pub to: AlertState,
    /// Notification to send, if any
    pub emit: Option<NotificationKind>,
}

impl Transition {
    /// Whether the state changed
    pub fn is_edge(&self) -> bool {
        self.from != self.to
    }
}

/// A raise or clear event, built once and fanned out to all targets
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub metric_name: String,
    /// Warning or clear OID of the metric
    pub oid: Oid,
    pub message: String,
    pub value: f64,
    pub emitted_at: SystemTime,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.metric_name, self.message)
    }
}
