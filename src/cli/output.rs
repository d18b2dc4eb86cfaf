//! Output formatting utilities
//!
//! Version text and the JSON line printed for every received trap.

use crate::snmp::ReceivedTrap;
use serde::Serialize;
use std::io::{self, Write};
use std::time::UNIX_EPOCH;

/// Version and build information shown by `-v`
pub fn version_text() -> String {
    format!(
        "{} {} ({}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// One received trap, flattened for log collectors
#[derive(Debug, Clone, Serialize)]
pub struct TrapRecord {
    /// Unix seconds
    pub timestamp: u64,
    pub remote_ip: String,
    pub remote_port: u16,
    #[serde(rename = "trapType")]
    pub trap_type: &'static str,
    pub trap_oid: String,
    pub uptime: String,
    /// Varbinds after sysUpTime.0 and snmpTrapOID.0
    pub binds: serde_json::Map<String, serde_json::Value>,
}

impl From<&ReceivedTrap> for TrapRecord {
    fn from(trap: &ReceivedTrap) -> Self {
        let pdu = &trap.message.pdu;

        let binds = pdu
            .varbinds
            .iter()
            .skip(2)
            .map(|vb| (vb.oid.to_string(), vb.value.to_string().into()))
            .collect();

        Self {
            timestamp: trap
                .received_at
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            remote_ip: trap.from.ip().to_string(),
            remote_port: trap.from.port(),
            trap_type: "v2",
            trap_oid: pdu.trap_oid().map(|o| o.to_string()).unwrap_or_default(),
            uptime: pdu.uptime().map(|t| t.to_string()).unwrap_or_default(),
            binds,
        }
    }
}

/// Print a trap as a single JSON line on stdout
pub fn print_trap(trap: &ReceivedTrap) -> io::Result<()> {
    let json = serde_json::to_string(&TrapRecord::from(trap)).map_err(io::Error::other)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json)?;
    handle.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::{TrapMessage, TrapPdu, Value, VarBind};
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_version_text() {
        let text = version_text();
        assert!(text.starts_with("trapmon "));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        assert!(text.contains(std::env::consts::OS));
    }

    #[test]
    fn test_trap_record_fields() {
        let metric_oid = "1.3.6.1.4.1.99999.1.1".parse().unwrap();
        let pdu = TrapPdu::new(vec![
            VarBind::uptime(4200),
            VarBind::trap_oid("1.3.6.1.4.1.99999.1.1".parse().unwrap()),
            VarBind::new(metric_oid, Value::OctetString(b"CPU high: 90".to_vec())),
            VarBind::sys_name("db-01"),
        ]);
        let trap = ReceivedTrap {
            from: "192.0.2.7:40000".parse().unwrap(),
            received_at: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            message: TrapMessage {
                version: 1,
                community: b"public".to_vec(),
                pdu,
            },
        };

        let json = serde_json::to_value(TrapRecord::from(&trap)).unwrap();

        assert_eq!(json["timestamp"], 1_700_000_000u64);
        assert_eq!(json["remote_ip"], "192.0.2.7");
        assert_eq!(json["remote_port"], 40000);
        assert_eq!(json["trapType"], "v2");
        assert_eq!(json["trap_oid"], "1.3.6.1.4.1.99999.1.1");
        assert_eq!(json["uptime"], "4200");
        assert_eq!(json["binds"]["1.3.6.1.4.1.99999.1.1"], "CPU high: 90");
        assert_eq!(json["binds"]["1.3.6.1.2.1.1.5.0"], "db-01");
        assert_eq!(json["binds"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_trap_record_without_system_binds() {
        let trap = ReceivedTrap {
            from: "[::1]:162".parse().unwrap(),
            received_at: SystemTime::now(),
            message: TrapMessage {
                version: 1,
                community: Vec::new(),
                pdu: TrapPdu::new(Vec::new()),
            },
        };

        let record = TrapRecord::from(&trap);
        assert_eq!(record.remote_ip, "::1");
        assert!(record.trap_oid.is_empty());
        assert!(record.binds.is_empty());
    }
}
