//! Receive command implementation
//!
//! Listens for SNMPv2c traps and prints each one as a JSON line.

use crate::cli::output::print_trap;
use crate::error::{AppError, Result};
use crate::services::ShutdownToken;
use crate::snmp::{ReceivedTrap, TrapReceiver};

use std::io;
use std::time::Duration;

/// How long one receive blocks before shutdown is checked again
const RECV_POLL: Duration = Duration::from_millis(200);

/// Execute the receive command
pub fn run_receive(addr: &str, community: Option<String>) -> Result<()> {
    let receiver = TrapReceiver::bind(addr, community, RECV_POLL)?;
    log::info!("Listening for traps on {}", receiver.local_addr()?);

    let shutdown = ShutdownToken::new();
    shutdown
        .install_signal_handler()
        .map_err(|e| AppError::Io(io::Error::other(e.to_string())))?;

    let count = receive_until(&receiver, &shutdown, print_trap)?;
    log::info!("Receiver stopped after {} trap(s)", count);
    Ok(())
}

/// Hand every trap to `on_trap` until `shutdown` is cancelled
///
/// Undecodable datagrams are logged and skipped. Returns the number of
/// traps handled.
pub fn receive_until<F>(
    receiver: &TrapReceiver,
    shutdown: &ShutdownToken,
    mut on_trap: F,
) -> Result<usize>
where
    F: FnMut(&ReceivedTrap) -> io::Result<()>,
{
    let mut count = 0;

    while !shutdown.is_cancelled() {
        match receiver.recv() {
            Ok(Some(trap)) => {
                on_trap(&trap)?;
                count += 1;
            }
            Ok(None) => {}
            Err(AppError::Codec(e)) => log::warn!("Dropping undecodable datagram: {}", e),
            Err(e) => return Err(e),
        }
    }

    Ok(count)
}
