//! Monitoring loop
//!
//! Samples every metric once per interval, feeds the verdicts to the alert
//! tracker and dispatches the resulting notifications.

use crate::alerts::{
    AlertPolicy, AlertTracker, MultiTargetDispatcher, NotificationComposer, NotificationKind,
    ThresholdEvaluator,
};
use crate::domain::{MetricSpec, Sample};
use crate::error::Result;
use crate::services::sampler::MetricSampler;
use crate::services::shutdown::ShutdownToken;

use std::time::{Duration, Instant};

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between cycle starts
    pub interval: Duration,
    /// Warning emission policy
    pub policy: AlertPolicy,
    /// Value for the optional sysName.0 varbind
    pub sys_name: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            policy: AlertPolicy::default(),
            sys_name: None,
        }
    }
}

/// Counters for one pass over all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Metrics sampled and evaluated successfully
    pub evaluated: usize,
    /// Metrics that failed to sample, parse or render
    pub failed: usize,
    pub warnings: usize,
    pub clears: usize,
}

/// Periodic metric monitor
pub struct Monitor<S: MetricSampler> {
    config: MonitorConfig,
    metrics: Vec<MetricSpec>,
    sampler: S,
    evaluator: ThresholdEvaluator,
    tracker: AlertTracker,
    composer: NotificationComposer,
    dispatcher: MultiTargetDispatcher,
}

impl<S: MetricSampler> Monitor<S> {
    /// Create a monitor; every metric starts `Normal`
    pub fn new(
        config: MonitorConfig,
        metrics: Vec<MetricSpec>,
        sampler: S,
        dispatcher: MultiTargetDispatcher,
    ) -> Self {
        let tracker = AlertTracker::new(config.policy);
        let composer = NotificationComposer::new(config.sys_name.clone());

        Self {
            config,
            metrics,
            sampler,
            evaluator: ThresholdEvaluator,
            tracker,
            composer,
            dispatcher,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &MultiTargetDispatcher {
        &self.dispatcher
    }

    /// Run cycles until `shutdown` is cancelled
    ///
    /// The first cycle starts one interval after this call. Ticks missed
    /// while a cycle overruns are skipped rather than queued.
    pub fn run(&self, shutdown: &ShutdownToken) {
        let interval = self.config.interval;
        log::info!(
            "Monitoring {} metric(s) every {:?} ({} policy, {} target(s))",
            self.metrics.len(),
            interval,
            self.config.policy,
            self.dispatcher.target_count()
        );

        let mut next_tick = Instant::now() + interval;
        loop {
            if shutdown.wait_timeout(next_tick.saturating_duration_since(Instant::now())) {
                break;
            }

            let report = self.run_cycle(shutdown);
            log::debug!(
                "Cycle done: {} evaluated, {} failed, {} warning(s), {} clear(s)",
                report.evaluated,
                report.failed,
                report.warnings,
                report.clears
            );

            next_tick += interval;
            let now = Instant::now();
            if next_tick <= now {
                let behind = (now - next_tick).as_nanos() / interval.as_nanos().max(1);
                let skipped = u32::try_from(behind + 1).unwrap_or(u32::MAX);
                log::warn!("Cycle overran the interval, skipping {} tick(s)", skipped);
                next_tick += interval.saturating_mul(skipped);
            }
        }

        let stats = self.dispatcher.stats();
        log::info!(
            "Monitor stopped ({} notification(s), {} delivered, {} failed attempt(s))",
            stats.notifications,
            stats.delivered,
            stats.failed
        );
    }

    /// Sample and evaluate every metric once, in configuration order
    ///
    /// Stops early, between metrics, once `shutdown` is cancelled.
    pub fn run_cycle(&self, shutdown: &ShutdownToken) -> CycleReport {
        let mut report = CycleReport::default();

        for spec in &self.metrics {
            if shutdown.is_cancelled() {
                log::debug!("Shutdown requested, abandoning cycle");
                break;
            }

            match self.process_metric(spec) {
                Ok(emitted) => {
                    report.evaluated += 1;
                    match emitted {
                        Some(NotificationKind::Warning) => report.warnings += 1,
                        Some(NotificationKind::Clear) => report.clears += 1,
                        None => {}
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    log::error!("Metric '{}': {}", spec.name, e);
                }
            }
        }

        report
    }

    fn process_metric(&self, spec: &MetricSpec) -> Result<Option<NotificationKind>> {
        let text = self.sampler.sample(spec)?;
        let (value, above) = self.evaluator.evaluate(spec, &text)?;
        let sample = Sample::now(spec.name.as_str(), value);
        log::debug!("Sampled {} (threshold {})", sample, spec.threshold);

        let transition = self.tracker.transition(&spec.name, above);
        if transition.is_edge() {
            log::info!(
                "Metric '{}' {} -> {} at {}",
                spec.name,
                transition.from,
                transition.to,
                value
            );
        }

        let Some(kind) = transition.emit else {
            return Ok(None);
        };

        let notification = self.composer.compose(kind, spec, value);
        let pdu = self.composer.to_pdu(&notification);
        self.dispatcher.dispatch(&notification, &pdu);

        Ok(Some(kind))
    }
}
