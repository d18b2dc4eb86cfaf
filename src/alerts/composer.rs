//! Notification composition
//!
//! Renders warning/clear messages from the metric's templates and packages
//! them into trap PDUs.

use super::types::{Notification, NotificationKind};
use crate::domain::MetricSpec;
use crate::snmp::{TrapPdu, Value, VarBind};

use std::time::{Instant, SystemTime};

/// Builds notifications and the trap PDUs that carry them
#[derive(Debug)]
pub struct NotificationComposer {
    started: Instant,
    sys_name: Option<String>,
}

impl NotificationComposer {
    /// Create a composer; uptime is measured from this call
    pub fn new(sys_name: Option<String>) -> Self {
        Self {
            started: Instant::now(),
            sys_name,
        }
    }

    /// Render the message for `kind` and build the notification
    pub fn compose(&self, kind: NotificationKind, spec: &MetricSpec, value: f64) -> Notification {
        let (template, oid) = match kind {
            NotificationKind::Warning => (&spec.warning_template, &spec.warning_oid),
            NotificationKind::Clear => (&spec.clear_template, &spec.clear_oid),
        };

        Notification {
            kind,
            metric_name: spec.name.clone(),
            oid: oid.clone(),
            message: template.render(value),
            value,
            emitted_at: SystemTime::now(),
        }
    }

    /// Varbinds: sysUpTime.0, snmpTrapOID.0, the metric message, then sysName.0
    pub fn to_pdu(&self, notification: &Notification) -> TrapPdu {
        let mut varbinds = vec![
            VarBind::uptime(self.uptime_ticks()),
            VarBind::trap_oid(notification.oid.clone()),
            VarBind::new(
                notification.oid.clone(),
                Value::OctetString(notification.message.as_bytes().to_vec()),
            ),
        ];

        if let Some(name) = &self.sys_name {
            varbinds.push(VarBind::sys_name(name));
        }

        TrapPdu::new(varbinds)
    }

    /// Hundredths of a second since creation, wrapping at 2^32
    pub fn uptime_ticks(&self) -> u32 {
        let hundredths = self.started.elapsed().as_millis() / 10;
        (hundredths % (1u128 << 32)) as u32
    }
}
