//! Trap dispatch
//!
//! Fans one notification out to every active trap target in parallel and
//! waits for all of them before returning.

use super::types::Notification;
use crate::error::TransportError;
use crate::snmp::{TrapPdu, TrapSender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Delivery result for one target
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub result: Result<(), TransportError>,
}

/// Per-target results of one dispatch
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl DispatchReport {
    /// Number of targets a send was attempted on
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of targets that accepted the trap
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Outcomes that failed
    pub fn failed(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// No target accepted the trap
    pub fn is_undelivered(&self) -> bool {
        self.attempted() > 0 && self.delivered() == 0
    }
}

/// Running delivery counters
#[derive(Debug, Default)]
pub struct DeliveryStats {
    notifications: AtomicU64,
    attempts: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    undelivered: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySnapshot {
    pub notifications: u64,
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
    /// Notifications no target accepted
    pub undelivered: u64,
}

impl DeliveryStats {
    fn record(&self, report: &DispatchReport) {
        let delivered = report.delivered() as u64;
        let attempted = report.attempted() as u64;

        self.notifications.fetch_add(1, Ordering::Relaxed);
        self.attempts.fetch_add(attempted, Ordering::Relaxed);
        self.delivered.fetch_add(delivered, Ordering::Relaxed);
        self.failed.fetch_add(attempted - delivered, Ordering::Relaxed);
        if report.is_undelivered() {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Read all counters
    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
        }
    }
}

/// Sends each notification to all active targets concurrently
///
/// The target set is fixed at construction. A failure on one target never
/// blocks or cancels delivery to the others.
pub struct MultiTargetDispatcher {
    senders: Vec<Box<dyn TrapSender>>,
    stats: DeliveryStats,
}

impl MultiTargetDispatcher {
    /// Create a dispatcher over already-connected senders
    pub fn new(senders: Vec<Box<dyn TrapSender>>) -> Self {
        Self {
            senders,
            stats: DeliveryStats::default(),
        }
    }

    /// Number of active targets
    pub fn target_count(&self) -> usize {
        self.senders.len()
    }

    /// Labels of the active targets
    pub fn targets(&self) -> Vec<&str> {
        self.senders.iter().map(|s| s.target()).collect()
    }

    /// Delivery counters since construction
    pub fn stats(&self) -> DeliverySnapshot {
        self.stats.snapshot()
    }

    /// Send `pdu` to every target, returning once all attempts finished
    pub fn dispatch(&self, notification: &Notification, pdu: &TrapPdu) -> DispatchReport {
        let outcomes: Vec<TargetOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .senders
                .iter()
                .map(|sender| (sender.target(), scope.spawn(move || sender.send(pdu))))
                .collect();

            handles
                .into_iter()
                .map(|(target, handle)| TargetOutcome {
                    target: target.to_string(),
                    result: handle
                        .join()
                        .unwrap_or_else(|_| Err(TransportError::Panicked(target.to_string()))),
                })
                .collect()
        });

        let report = DispatchReport { outcomes };

        for outcome in report.failed() {
            if let Err(e) = &outcome.result {
                log::warn!("Failed to send {} trap: {}", notification.kind, e);
            }
        }

        if report.is_undelivered() {
            log::error!(
                "{} for '{}' was not delivered to any of {} target(s)",
                notification.kind,
                notification.metric_name,
                report.attempted()
            );
        } else {
            log::info!(
                "Sent {} trap for '{}' to {}/{} target(s): {}",
                notification.kind,
                notification.metric_name,
                report.delivered(),
                report.attempted(),
                notification.message
            );
        }

        self.stats.record(&report);
        report
    }
}

impl std::fmt::Debug for MultiTargetDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiTargetDispatcher")
            .field("targets", &self.targets())
            .field("stats", &self.stats)
            .finish()
    }
}
