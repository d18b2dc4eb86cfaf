//! Mock implementations for testing
//!
//! Provides a scripted sampler and a recording trap sender so the monitor
//! can be driven without subprocesses or sockets.

use crate::domain::MetricSpec;
use crate::error::{SampleError, TransportError};
use crate::snmp::{TrapPdu, TrapSender};

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sampler that replays per-metric outputs in order
#[derive(Debug, Default)]
pub struct MockSampler {
    outputs: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue successful outputs for a metric
    pub fn with_outputs(self, metric: &str, outputs: &[&str]) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .entry(metric.to_string())
            .or_default()
            .extend(outputs.iter().map(|o| Ok(o.to_string())));
        self
    }

    /// Queue an execution failure for a metric
    pub fn with_failure(self, metric: &str, message: &str) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .entry(metric.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }
}

impl crate::services::MetricSampler for MockSampler {
    fn sample(&self, spec: &MetricSpec) -> Result<String, SampleError> {
        let next = self
            .outputs
            .lock()
            .unwrap()
            .get_mut(&spec.name)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(SampleError::Execution {
                source_desc: spec.source.to_string(),
                message,
            }),
            None => Err(SampleError::Execution {
                source_desc: spec.source.to_string(),
                message: "no scripted output left".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendMode {
    Accept,
    Fail,
    Panic,
}

/// Trap sender that records every PDU it is handed
///
/// Clones share the recorded state.
#[derive(Debug, Clone)]
pub struct MockSender {
    label: String,
    mode: SendMode,
    attempts: Arc<AtomicUsize>,
    sent: Arc<Mutex<Vec<TrapPdu>>>,
}

impl MockSender {
    fn with_mode(label: impl Into<String>, mode: SendMode) -> Self {
        Self {
            label: label.into(),
            mode,
            attempts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sender that accepts every trap
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_mode(label, SendMode::Accept)
    }

    /// Sender whose every send fails with an IO error
    pub fn failing(label: impl Into<String>) -> Self {
        Self::with_mode(label, SendMode::Fail)
    }

    /// Sender that panics mid-send
    pub fn panicking(label: impl Into<String>) -> Self {
        Self::with_mode(label, SendMode::Panic)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// PDUs accepted so far
    pub fn sent(&self) -> Vec<TrapPdu> {
        self.sent.lock().unwrap().clone()
    }
}

impl TrapSender for MockSender {
    fn send(&self, pdu: &TrapPdu) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            SendMode::Accept => {
                self.sent.lock().unwrap().push(pdu.clone());
                Ok(())
            }
            SendMode::Fail => Err(TransportError::Io {
                target: self.label.clone(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "mock failure"),
            }),
            SendMode::Panic => panic!("mock sender {} panicked", self.label),
        }
    }

    fn target(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricSource, Template};
    use crate::services::MetricSampler;

    fn spec(name: &str) -> MetricSpec {
        MetricSpec {
            name: name.to_string(),
            source: MetricSource::Command("true".to_string()),
            threshold: 1.0,
            warning_oid: "1.3.6.1.4.1.99999.1.1".parse().unwrap(),
            clear_oid: "1.3.6.1.4.1.99999.1.2".parse().unwrap(),
            warning_template: Template::parse("high %f").unwrap(),
            clear_template: Template::parse("ok %f").unwrap(),
        }
    }

    #[test]
    fn test_mock_sampler_replays_in_order() {
        let sampler = MockSampler::new()
            .with_outputs("cpu", &["1", "2"])
            .with_failure("cpu", "boom");

        assert_eq!(sampler.sample(&spec("cpu")).unwrap(), "1");
        assert_eq!(sampler.sample(&spec("cpu")).unwrap(), "2");
        assert!(sampler.sample(&spec("cpu")).is_err());
        assert!(sampler.sample(&spec("cpu")).is_err());
        assert!(sampler.sample(&spec("other")).is_err());
    }

    #[test]
    fn test_mock_sender_clones_share_state() {
        let sender = MockSender::new("t");
        let clone = sender.clone();
        clone.send(&TrapPdu::new(Vec::new())).unwrap();

        assert_eq!(sender.attempts(), 1);
        assert_eq!(sender.sent().len(), 1);
        assert!(MockSender::failing("f").send(&TrapPdu::new(Vec::new())).is_err());
    }
}
