//! Trap receiver
//!
//! Listens for SNMPv2c traps on a UDP socket. Used by `--listen` to check
//! what the monitor sends, and by the integration tests.

use super::pdu::{decode_v2c_trap, TrapMessage};
use crate::error::{AppError, Result};

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, SystemTime};

/// Largest datagram accepted
const MAX_DATAGRAM: usize = 65_535;

/// A trap as it arrived
#[derive(Debug, Clone)]
pub struct ReceivedTrap {
    pub from: SocketAddr,
    pub received_at: SystemTime,
    pub message: TrapMessage,
}

/// UDP trap listener
pub struct TrapReceiver {
    socket: UdpSocket,
    community: Option<String>,
}

impl TrapReceiver {
    /// Bind a receiver, optionally accepting only one community
    ///
    /// `poll` bounds how long a single `recv` blocks so callers can check
    /// for shutdown between datagrams.
    pub fn bind(addr: &str, community: Option<String>, poll: Duration) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(poll))?;
        Ok(Self { socket, community })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait for the next trap
    ///
    /// Returns `Ok(None)` when the poll interval elapses or the datagram's
    /// community does not match.
    pub fn recv(&self) -> Result<Option<ReceivedTrap>> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (len, from) = match self.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let message = decode_v2c_trap(&buf[..len])?;

        if let Some(expected) = &self.community {
            if message.community != expected.as_bytes() {
                log::warn!("Dropping trap from {} with unexpected community", from);
                return Ok(None);
            }
        }

        Ok(Some(ReceivedTrap {
            from,
            received_at: SystemTime::now(),
            message,
        }))
    }
}
