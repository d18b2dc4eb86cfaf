//! SNMP trap layer
//!
//! SNMPv2c trap PDUs over the `rasn-snmp` codec, and the UDP transport
//! behind the `TrapSender` seam.

pub mod pdu;
pub mod receiver;
pub mod transport;

pub use pdu::{decode_v2c_trap, encode_v2c_trap, Oid, TrapMessage, TrapPdu, Value, VarBind};
pub use receiver::{ReceivedTrap, TrapReceiver};
pub use transport::{
    connect_targets, SnmpVersion, TrapSender, TrapTarget, UdpTrapSender, DEFAULT_TRAP_PORT,
};
