//! Trap transport
//!
//! The `TrapSender` trait is the seam between the alert engine and the
//! wire. `UdpTrapSender` is the production implementation: one connected
//! UDP socket per target, owned exclusively by that target.

use super::pdu::{encode_v2c_trap, TrapPdu};
use crate::error::TransportError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Default trap receiver port
pub const DEFAULT_TRAP_PORT: u16 = 162;

/// SNMP protocol version used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SnmpVersion {
    /// Community-based SNMPv2
    #[default]
    #[serde(rename = "2c", alias = "v2c")]
    V2c,
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2c => write!(f, "v2c"),
        }
    }
}

/// A configured trap receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapTarget {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub version: SnmpVersion,
    /// Socket write timeout
    pub timeout: Duration,
}

impl TrapTarget {
    /// `host:port` label used in logs and reports
    pub fn label(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Delivery channel to a single trap receiver
pub trait TrapSender: Send + Sync {
    /// Send one trap, returning once the transport accepted it
    fn send(&self, pdu: &TrapPdu) -> Result<(), TransportError>;

    /// Target label for identification
    fn target(&self) -> &str;
}

/// UDP trap sender bound to one target
#[derive(Debug)]
pub struct UdpTrapSender {
    label: String,
    community: String,
    socket: UdpSocket,
}

impl UdpTrapSender {
    /// Resolve the target and open a connected socket to it
    pub fn connect(target: &TrapTarget) -> Result<Self, TransportError> {
        let label = target.label();
        let io_err = |source| TransportError::Io {
            target: label.clone(),
            source,
        };

        let addr = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                target: label.clone(),
                message: e.to_string(),
            })?
            .next()
            .ok_or_else(|| TransportError::Resolve {
                target: label.clone(),
                message: "no addresses found".to_string(),
            })?;

        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).map_err(io_err)?;
        socket.connect(addr).map_err(io_err)?;
        socket
            .set_write_timeout(Some(target.timeout))
            .map_err(io_err)?;

        Ok(Self {
            label,
            community: target.community.clone(),
            socket,
        })
    }
}

impl TrapSender for UdpTrapSender {
    fn send(&self, pdu: &TrapPdu) -> Result<(), TransportError> {
        let datagram =
            encode_v2c_trap(&self.community, pdu).map_err(|source| TransportError::Encode {
                target: self.label.clone(),
                source,
            })?;
        let sent = self
            .socket
            .send(&datagram)
            .map_err(|source| TransportError::Io {
                target: self.label.clone(),
                source,
            })?;

        if sent != datagram.len() {
            return Err(TransportError::Io {
                target: self.label.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    format!("short write ({} of {} bytes)", sent, datagram.len()),
                ),
            });
        }

        Ok(())
    }

    fn target(&self) -> &str {
        &self.label
    }
}

/// Connect to every target once, dropping the ones that fail
///
/// Dropped targets stay inactive for the rest of the process.
pub fn connect_targets(targets: &[TrapTarget]) -> Vec<Box<dyn TrapSender>> {
    let mut senders: Vec<Box<dyn TrapSender>> = Vec::with_capacity(targets.len());

    for target in targets {
        match UdpTrapSender::connect(target) {
            Ok(sender) => {
                log::info!(
                    "Connected to trap target {} ({})",
                    sender.target(),
                    target.version
                );
                senders.push(Box::new(sender));
            }
            Err(e) => {
                log::warn!("Failed to connect to trap target {}: {}", target.label(), e);
            }
        }
    }

    senders
}
