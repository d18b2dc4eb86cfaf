//! Configuration system
//!
//! Handles JSON config file parsing, validation and conversion into the
//! domain types the monitor runs on.

pub mod file;

pub use file::ConfigFile;

use crate::alerts::AlertPolicy;
use crate::domain::{MetricSource, MetricSpec, Template};
use crate::error::ConfigError;
use crate::services::sampler::{DEFAULT_MAX_OUTPUT, DEFAULT_SHELL};
use crate::services::{CommandSampler, MonitorConfig};
use crate::snmp::{Oid, SnmpVersion, TrapTarget, DEFAULT_TRAP_PORT};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Root of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings
    pub config: GeneralConfig,
    /// Monitored metrics, evaluated in this order
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
    /// Free-form section, accepted and ignored
    #[serde(default)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    /// Seconds between cycles
    pub interval: Option<u64>,
    #[serde(default)]
    pub alert_policy: AlertPolicy,
    /// Seconds a metric command may run before it is killed
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,
    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,
    /// Interpreter for `command` metrics
    #[serde(default = "default_shell")]
    pub shell: String,
    pub snmp: SnmpConfig,
}

/// Trap destination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpConfig {
    #[serde(default)]
    pub community: String,
    #[serde(default)]
    pub targets: Vec<String>,
    /// Zero or absent means 162
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub version: SnmpVersion,
    /// Socket write timeout in seconds
    #[serde(default = "default_send_timeout")]
    pub timeout: u64,
    /// Adds a sysName.0 varbind to every trap
    #[serde(default)]
    pub sys_name: Option<String>,
}

/// How a metric's `command` field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Path to an executable
    Script,
    /// Shell command line
    Command,
}

/// One metric entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub command: String,
    pub warning_oid: String,
    pub clear_oid: String,
    pub warning_template: String,
    pub clear_template: String,
    pub threshold: f64,
}

fn default_command_timeout() -> u64 {
    10
}

fn default_max_output() -> usize {
    DEFAULT_MAX_OUTPUT
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_send_timeout() -> u64 {
    2
}

impl Config {
    /// Parse a JSON document and validate it
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every rule that does not need conversion to domain types
    pub fn validate(&self) -> Result<(), ConfigError> {
        let general = &self.config;

        match general.interval {
            None => return Err(ConfigError::MissingField("config.interval".to_string())),
            Some(0) => return Err(ConfigError::invalid("config.interval", "must be > 0")),
            Some(_) => {}
        }
        if general.command_timeout == 0 {
            return Err(ConfigError::invalid("config.commandTimeout", "must be > 0"));
        }
        if general.max_output_bytes == 0 {
            return Err(ConfigError::invalid("config.maxOutputBytes", "must be > 0"));
        }
        if general.shell.trim().is_empty() {
            return Err(ConfigError::invalid("config.shell", "must not be empty"));
        }

        let snmp = &general.snmp;
        if snmp.community.is_empty() {
            return Err(ConfigError::MissingField("config.snmp.community".to_string()));
        }
        if snmp.targets.is_empty() {
            return Err(ConfigError::MissingField("config.snmp.targets".to_string()));
        }
        if let Some(i) = snmp.targets.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("config.snmp.targets[{}]", i),
                "must not be empty",
            ));
        }
        if snmp.timeout == 0 {
            return Err(ConfigError::invalid("config.snmp.timeout", "must be > 0"));
        }

        let mut names = HashSet::new();
        for (i, metric) in self.metrics.iter().enumerate() {
            if metric.name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("metrics[{}].name", i),
                    "must not be empty",
                ));
            }
            if !names.insert(metric.name.as_str()) {
                return Err(ConfigError::invalid(
                    format!("metrics[{}].name", i),
                    format!("duplicate metric name '{}'", metric.name),
                ));
            }
            metric.to_spec()?;
        }

        Ok(())
    }

    /// Validated metric definitions in configuration order
    pub fn to_metric_specs(&self) -> Result<Vec<MetricSpec>, ConfigError> {
        self.metrics.iter().map(MetricConfig::to_spec).collect()
    }

    /// One target per configured host, sharing port and community
    pub fn to_targets(&self) -> Vec<TrapTarget> {
        let snmp = &self.config.snmp;
        snmp.targets
            .iter()
            .map(|host| TrapTarget {
                host: host.trim().to_string(),
                port: self.trap_port(),
                community: snmp.community.clone(),
                version: snmp.version,
                timeout: Duration::from_secs(snmp.timeout),
            })
            .collect()
    }

    /// Configured trap port, 162 when unset
    pub fn trap_port(&self) -> u16 {
        match self.config.snmp.port {
            0 => DEFAULT_TRAP_PORT,
            port => port,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval.unwrap_or(0))
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: self.interval(),
            policy: self.config.alert_policy,
            sys_name: self.config.snmp.sys_name.clone(),
        }
    }

    pub fn sampler(&self) -> CommandSampler {
        CommandSampler::new(
            self.config.shell.clone(),
            Duration::from_secs(self.config.command_timeout),
            self.config.max_output_bytes,
        )
    }
}

impl MetricConfig {
    /// Convert to a domain metric, validating identifiers and templates
    pub fn to_spec(&self) -> Result<MetricSpec, ConfigError> {
        let key = |field: &str| format!("metrics.{}.{}", self.name, field);

        if self.command.trim().is_empty() {
            return Err(ConfigError::invalid(key("command"), "must not be empty"));
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::invalid(key("threshold"), "must be a finite number"));
        }

        let parse_oid = |field: &str, raw: &str| {
            raw.parse::<Oid>()
                .map_err(|e| ConfigError::invalid(key(field), e.to_string()))
        };
        let warning_oid = parse_oid("warningOid", &self.warning_oid)?;
        let clear_oid = parse_oid("clearOid", &self.clear_oid)?;

        let warning_template = Template::parse(&self.warning_template)
            .map_err(|e| ConfigError::invalid(key("warningTemplate"), e.to_string()))?;
        let clear_template = Template::parse(&self.clear_template)
            .map_err(|e| ConfigError::invalid(key("clearTemplate"), e.to_string()))?;

        let source = match self.kind {
            SourceKind::Script => MetricSource::Script(PathBuf::from(&self.command)),
            SourceKind::Command => MetricSource::Command(self.command.clone()),
        };

        Ok(MetricSpec {
            name: self.name.clone(),
            source,
            threshold: self.threshold,
            warning_oid,
            clear_oid,
            warning_template,
            clear_template,
        })
    }
}
