//! Metric domain types
//!
//! A metric is an external command whose standard output is a single
//! number, plus the threshold and trap identifiers that go with it.

use super::template::Template;
use crate::snmp::Oid;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Where a metric's value comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSource {
    /// Executable file run directly, without arguments
    Script(PathBuf),
    /// Command line interpreted by the shell
    Command(String),
}

impl fmt::Display for MetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(path) => write!(f, "script {}", path.display()),
            Self::Command(cmd) => write!(f, "command `{}`", cmd),
        }
    }
}

/// Fully validated metric definition
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub name: String,
    pub source: MetricSource,
    /// Values strictly above this raise an alert
    pub threshold: f64,
    pub warning_oid: Oid,
    pub clear_oid: Oid,
    pub warning_template: Template,
    pub clear_template: Template,
}

impl MetricSpec {
    /// Whether a value is above this metric's threshold
    #[inline]
    pub fn is_above(&self, value: f64) -> bool {
        value > self.threshold
    }
}

/// One observation of a metric
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric_name: String,
    pub value: f64,
    pub timestamp: SystemTime,
}

impl Sample {
    /// Create a sample stamped with the current time
    pub fn now(metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            timestamp: SystemTime::now(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.metric_name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        let script = MetricSource::Script(PathBuf::from("/opt/check.sh"));
        assert_eq!(script.to_string(), "script /opt/check.sh");

        let cmd = MetricSource::Command("echo 1 | cat".to_string());
        assert_eq!(cmd.to_string(), "command `echo 1 | cat`");
    }

    #[test]
    fn test_sample_display() {
        let sample = Sample::now("cpu_load", 90.5);
        assert_eq!(sample.to_string(), "cpu_load=90.5");
    }
}
