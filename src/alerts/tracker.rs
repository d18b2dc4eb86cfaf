//! Alert state tracker
//!
//! Holds the Normal/Alerting state of every metric and decides, per verdict,
//! whether a warning or clear notification is due.

use super::types::{AlertPolicy, AlertState, NotificationKind, Transition};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Per-metric hysteresis state
///
/// Metrics absent from the map are `Normal`. Each transition reads and
/// writes a metric's state under one lock acquisition.
#[derive(Debug, Default)]
pub struct AlertTracker {
    policy: AlertPolicy,
    states: Mutex<HashMap<String, AlertState>>,
}

impl AlertTracker {
    /// Create a tracker with every metric starting `Normal`
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Emission policy in effect
    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Feed one verdict for a metric and commit the resulting state
    pub fn transition(&self, metric: &str, above_threshold: bool) -> Transition {
        let mut states = self.lock();
        let from = states.get(metric).copied().unwrap_or_default();

        let (to, emit) = match (from, above_threshold) {
            (AlertState::Normal, false) => (AlertState::Normal, None),
            (AlertState::Normal, true) => (AlertState::Alerting, Some(NotificationKind::Warning)),
            (AlertState::Alerting, false) => (AlertState::Normal, Some(NotificationKind::Clear)),
            (AlertState::Alerting, true) => match self.policy {
                AlertPolicy::Edge => (AlertState::Alerting, None),
                AlertPolicy::Repeat => (AlertState::Alerting, Some(NotificationKind::Warning)),
            },
        };

        if to == AlertState::Normal {
            states.remove(metric);
        } else {
            states.insert(metric.to_string(), to);
        }

        Transition { from, to, emit }
    }

    /// Current state of a metric
    pub fn state(&self, metric: &str) -> AlertState {
        self.lock().get(metric).copied().unwrap_or_default()
    }

    /// Names of metrics currently alerting, sorted
    pub fn alerting_metrics(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, state)| **state == AlertState::Alerting)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AlertState>> {
        // Entries are plain values; a poisoned map is still consistent.
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn feed(tracker: &AlertTracker, metric: &str, verdicts: &[bool]) -> Vec<Option<NotificationKind>> {
        verdicts
            .iter()
            .map(|&v| tracker.transition(metric, v).emit)
            .collect()
    }

    #[test]
    fn test_cold_start_is_normal() {
        let tracker = AlertTracker::new(AlertPolicy::Edge);
        assert_eq!(tracker.state("cpu_load"), AlertState::Normal);
        assert!(tracker.alerting_metrics().is_empty());
    }

    #[test]
    fn test_normal_false_emits_nothing() {
        let tracker = AlertTracker::new(AlertPolicy::Edge);
        let t = tracker.transition("cpu_load", false);
        assert_eq!(t.from, AlertState::Normal);
        assert_eq!(t.to, AlertState::Normal);
        assert_eq!(t.emit, None);
    }

    #[test]
    fn test_edge_policy_sequence() {
        let tracker = AlertTracker::new(AlertPolicy::Edge);
        let emitted = feed(&tracker, "cpu_load", &[false, true, true, true, false, false, true]);

        assert_eq!(
            emitted,
            vec![
                None,
                Some(NotificationKind::Warning),
                None,
                None,
                Some(NotificationKind::Clear),
                None,
                Some(NotificationKind::Warning),
            ]
        );
        assert_eq!(tracker.state("cpu_load"), AlertState::Alerting);
    }

    #[test]
    fn test_repeat_policy_sequence() {
        let tracker = AlertTracker::new(AlertPolicy::Repeat);
        let emitted = feed(&tracker, "disk", &[true, true, false, false]);

        assert_eq!(
            emitted,
            vec![
                Some(NotificationKind::Warning),
                Some(NotificationKind::Warning),
                Some(NotificationKind::Clear),
                None,
            ]
        );
        assert_eq!(tracker.state("disk"), AlertState::Normal);
    }

    #[test]
    fn test_metrics_are_independent() {
        let tracker = AlertTracker::new(AlertPolicy::Edge);
        tracker.transition("cpu", true);
        tracker.transition("mem", false);
        tracker.transition("disk", true);

        assert_eq!(tracker.alerting_metrics(), vec!["cpu".to_string(), "disk".to_string()]);
        assert_eq!(tracker.state("mem"), AlertState::Normal);
    }

    #[test]
    fn test_concurrent_transitions_emit_one_warning() {
        let tracker = Arc::new(AlertTracker::new(AlertPolicy::Edge));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || tracker.transition("shared", true).emit)
            })
            .collect();

        let warnings = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|emit| *emit == Some(NotificationKind::Warning))
            .count();

        assert_eq!(warnings, 1);
    }
}
