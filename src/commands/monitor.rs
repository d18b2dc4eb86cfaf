//! Monitor command implementation
//!
//! Loads the configuration, connects the trap targets and runs the
//! monitoring loop until Ctrl+C or SIGTERM.

use crate::alerts::MultiTargetDispatcher;
use crate::config::{Config, ConfigFile};
use crate::error::{AppError, Result};
use crate::services::{CommandSampler, Monitor, ShutdownToken};
use crate::snmp::connect_targets;

use std::io;
use std::path::Path;

/// Execute the monitor command
pub fn run_monitor(config_path: Option<&Path>) -> Result<()> {
    let path = ConfigFile::resolve(config_path);
    let config = ConfigFile::load(&path)?;
    log::info!("Loaded config from {}", path.display());

    let monitor = build_monitor(&config)?;

    let shutdown = ShutdownToken::new();
    shutdown
        .install_signal_handler()
        .map_err(|e| AppError::Io(io::Error::other(e.to_string())))?;

    monitor.run(&shutdown);
    Ok(())
}

/// Wire a validated configuration into a ready monitor
///
/// Connects every target once; unreachable ones are dropped. Fails only
/// when none is left.
pub fn build_monitor(config: &Config) -> Result<Monitor<CommandSampler>> {
    let metrics = config.to_metric_specs()?;
    if metrics.is_empty() {
        log::warn!("No metrics configured, nothing will be sampled");
    }

    let targets = config.to_targets();
    let senders = connect_targets(&targets);
    if senders.is_empty() {
        return Err(AppError::NoReachableTargets);
    }
    if senders.len() < targets.len() {
        log::warn!(
            "{} of {} trap target(s) unreachable and dropped",
            targets.len() - senders.len(),
            targets.len()
        );
    }

    Ok(Monitor::new(
        config.monitor_config(),
        metrics,
        config.sampler(),
        MultiTargetDispatcher::new(senders),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(targets: &[&str]) -> Config {
        let json = serde_json::json!({
            "config": {
                "interval": 1,
                "snmp": { "community": "public", "targets": targets, "port": 9 }
            },
            "metrics": [{
                "name": "one",
                "type": "command",
                "command": "echo 1",
                "warningOid": "1.3.6.1.4.1.99999.1.1",
                "clearOid": "1.3.6.1.4.1.99999.1.2",
                "warningTemplate": "high %v",
                "clearTemplate": "ok %v",
                "threshold": 5
            }]
        });
        Config::from_json(&json.to_string()).unwrap()
    }

    #[test]
    fn test_unreachable_targets_are_dropped() {
        let monitor = build_monitor(&config(&["127.0.0.1", "host.invalid"])).unwrap();
        assert_eq!(monitor.dispatcher().targets(), vec!["127.0.0.1:9"]);
    }

    #[test]
    fn test_no_reachable_targets_is_fatal() {
        let result = build_monitor(&config(&["host.invalid"]));
        assert!(matches!(result, Err(AppError::NoReachableTargets)));
    }

    #[test]
    fn test_missing_config_file() {
        let result = run_monitor(Some(Path::new("/nonexistent/trapmon.json")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
