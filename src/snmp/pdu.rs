//! SNMPv2c trap PDU types
//!
//! Object identifiers, variable bindings and the v2c trap message. The
//! wire form is the SNMPv2-Trap-PDU (RFC 3416) in the community-based
//! envelope, encoded with `rasn` BER.

use crate::error::CodecError;
use rasn::types::{Integer, ObjectIdentifier, OctetString};
use rasn_smi::v1::TimeTicks;
use rasn_smi::v2::{ApplicationSyntax, ObjectSyntax, SimpleSyntax};
use rasn_snmp::{v2, v2c};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// SNMP version field value for v2c
pub const VERSION_2C: i64 = 1;

/// SNMPv2-MIB::sysUpTime.0
pub const SYS_UPTIME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 3, 0];
/// SNMPv2-MIB::snmpTrapOID.0
pub const SNMP_TRAP_OID: &[u32] = &[1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0];
/// SNMPv2-MIB::sysName.0
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];

static NEXT_REQUEST_ID: AtomicU32 = AtomicU32::new(1);

/// Object identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    /// Create an OID from arcs, validating the first two
    pub fn from_arcs(arcs: &[u32]) -> Result<Self, CodecError> {
        if arcs.len() < 2 {
            return Err(CodecError::InvalidOid(
                "at least two arcs are required".to_string(),
            ));
        }
        if arcs[0] > 2 {
            return Err(CodecError::InvalidOid(format!(
                "first arc must be 0, 1 or 2 (got {})",
                arcs[0]
            )));
        }
        if arcs[0] < 2 && arcs[1] >= 40 {
            return Err(CodecError::InvalidOid(format!(
                "second arc must be below 40 under arc {} (got {})",
                arcs[0], arcs[1]
            )));
        }
        Ok(Self(arcs.to_vec()))
    }

    /// Get the arcs
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    fn well_known(arcs: &'static [u32]) -> Self {
        Self(arcs.to_vec())
    }

    fn to_wire(&self) -> Result<ObjectIdentifier, CodecError> {
        ObjectIdentifier::new(self.0.clone())
            .ok_or_else(|| CodecError::InvalidOid(self.to_string()))
    }

    fn from_wire(oid: &ObjectIdentifier) -> Self {
        Self(oid.to_vec())
    }
}

impl FromStr for Oid {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let dotted = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if dotted.is_empty() {
            return Err(CodecError::InvalidOid("empty".to_string()));
        }

        let arcs = dotted
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| CodecError::InvalidOid(format!("bad arc '{}' in '{}'", part, s)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_arcs(&arcs)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

/// Variable binding value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Oid),
    /// Hundredths of a second
    TimeTicks(u32),
    /// Any other received syntax, kept in its debug form
    Other(String),
}

impl Value {
    fn to_wire(&self) -> Result<v2::VarBindValue, CodecError> {
        let syntax = match self {
            Self::Integer(v) => ObjectSyntax::Simple(SimpleSyntax::Integer(Integer::from(*v))),
            Self::OctetString(bytes) => {
                ObjectSyntax::Simple(SimpleSyntax::String(OctetString::from(bytes.clone())))
            }
            Self::Null => return Ok(v2::VarBindValue::Unspecified),
            Self::ObjectIdentifier(oid) => {
                ObjectSyntax::Simple(SimpleSyntax::ObjectId(oid.to_wire()?))
            }
            Self::TimeTicks(t) => {
                ObjectSyntax::ApplicationWide(ApplicationSyntax::Ticks(TimeTicks(*t)))
            }
            Self::Other(text) => {
                return Err(CodecError::Encode(format!("cannot re-encode value {}", text)))
            }
        };
        Ok(v2::VarBindValue::Value(syntax))
    }

    fn from_wire(value: v2::VarBindValue) -> Result<Self, CodecError> {
        Ok(match value {
            v2::VarBindValue::Value(ObjectSyntax::Simple(SimpleSyntax::Integer(v))) => {
                Self::Integer(convert_integer(&v)?)
            }
            v2::VarBindValue::Value(ObjectSyntax::Simple(SimpleSyntax::String(bytes))) => {
                Self::OctetString(bytes.to_vec())
            }
            v2::VarBindValue::Value(ObjectSyntax::Simple(SimpleSyntax::ObjectId(oid))) => {
                Self::ObjectIdentifier(Oid::from_wire(&oid))
            }
            v2::VarBindValue::Value(ObjectSyntax::ApplicationWide(ApplicationSyntax::Ticks(
                ticks,
            ))) => Self::TimeTicks(ticks.0),
            v2::VarBindValue::Unspecified => Self::Null,
            other => Self::Other(format!("{:?}", other)),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::OctetString(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Self::Null => Ok(()),
            Self::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Self::TimeTicks(t) => write!(f, "{}", t),
            Self::Other(text) => write!(f, "{}", text),
        }
    }
}

/// A single (identifier, value) binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    /// Create a new variable binding
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// sysUpTime.0 binding
    pub fn uptime(ticks: u32) -> Self {
        Self::new(Oid::well_known(SYS_UPTIME), Value::TimeTicks(ticks))
    }

    /// snmpTrapOID.0 binding naming the notification
    pub fn trap_oid(oid: Oid) -> Self {
        Self::new(Oid::well_known(SNMP_TRAP_OID), Value::ObjectIdentifier(oid))
    }

    /// sysName.0 binding carrying the sender's identity
    pub fn sys_name(name: &str) -> Self {
        Self::new(
            Oid::well_known(SYS_NAME),
            Value::OctetString(name.as_bytes().to_vec()),
        )
    }

    fn to_wire(&self) -> Result<v2::VarBind, CodecError> {
        Ok(v2::VarBind {
            name: self.oid.to_wire()?,
            value: self.value.to_wire()?,
        })
    }

    fn from_wire(vb: v2::VarBind) -> Result<Self, CodecError> {
        Ok(Self::new(Oid::from_wire(&vb.name), Value::from_wire(vb.value)?))
    }
}

/// SNMPv2-Trap-PDU contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapPdu {
    pub request_id: i32,
    pub varbinds: Vec<VarBind>,
}

impl TrapPdu {
    /// Create a PDU with a fresh request id
    pub fn new(varbinds: Vec<VarBind>) -> Self {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed) & 0x7fff_ffff;
        Self {
            request_id: id as i32,
            varbinds,
        }
    }

    /// The notification OID carried in snmpTrapOID.0, if present
    pub fn trap_oid(&self) -> Option<&Oid> {
        self.varbinds.iter().find_map(|vb| match &vb.value {
            Value::ObjectIdentifier(oid) if vb.oid.arcs() == SNMP_TRAP_OID => Some(oid),
            _ => None,
        })
    }

    /// The uptime carried in sysUpTime.0, if present
    pub fn uptime(&self) -> Option<u32> {
        self.varbinds.iter().find_map(|vb| match vb.value {
            Value::TimeTicks(t) if vb.oid.arcs() == SYS_UPTIME => Some(t),
            _ => None,
        })
    }
}

/// A decoded community-based message carrying a trap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapMessage {
    pub version: i64,
    pub community: Vec<u8>,
    pub pdu: TrapPdu,
}

/// Re-read any BER INTEGER as a native integer
fn convert_integer<T: rasn::Decode>(value: &impl rasn::Encode) -> Result<T, CodecError> {
    let bytes = rasn::ber::encode(value).map_err(|e| CodecError::Encode(e.to_string()))?;
    rasn::ber::decode(&bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode a v2c trap message
pub fn encode_v2c_trap(community: &str, pdu: &TrapPdu) -> Result<Vec<u8>, CodecError> {
    let variable_bindings = pdu
        .varbinds
        .iter()
        .map(VarBind::to_wire)
        .collect::<Result<Vec<_>, _>>()?;

    let message = v2c::Message {
        version: Integer::from(VERSION_2C),
        community: OctetString::from(community.as_bytes().to_vec()),
        data: v2::Pdus::Trap(v2::Trap(v2::Pdu {
            request_id: pdu.request_id.into(),
            error_status: 0u32.into(),
            error_index: 0u32.into(),
            variable_bindings,
        })),
    };

    rasn::ber::encode(&message).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a v2c trap message
pub fn decode_v2c_trap(datagram: &[u8]) -> Result<TrapMessage, CodecError> {
    let message: v2c::Message<v2::Pdus> =
        rasn::ber::decode(datagram).map_err(|e| CodecError::Decode(e.to_string()))?;

    if message.version != Integer::from(VERSION_2C) {
        return Err(CodecError::UnsupportedVersion);
    }

    let trap = match message.data {
        v2::Pdus::Trap(trap) => trap.0,
        _ => return Err(CodecError::UnexpectedPdu),
    };

    let request_id = convert_integer(&trap.request_id)?;
    let varbinds = trap
        .variable_bindings
        .into_iter()
        .map(VarBind::from_wire)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TrapMessage {
        version: VERSION_2C,
        community: message.community.to_vec(),
        pdu: TrapPdu {
            request_id,
            varbinds,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_parse_leading_dot() {
        let oid: Oid = ".1.3.6.1.4.1.99999.1.1".parse().unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 4, 1, 99999, 1, 1]);
        assert_eq!(oid.to_string(), "1.3.6.1.4.1.99999.1.1");
    }

    #[test]
    fn test_oid_parse_rejects_garbage() {
        assert!("".parse::<Oid>().is_err());
        assert!(".".parse::<Oid>().is_err());
        assert!("1".parse::<Oid>().is_err());
        assert!("1.3.x.1".parse::<Oid>().is_err());
        assert!("3.1".parse::<Oid>().is_err());
        assert!("1.40".parse::<Oid>().is_err());
        assert!("1..3".parse::<Oid>().is_err());
        assert!("2.999".parse::<Oid>().is_ok());
    }

    #[test]
    fn test_encode_known_message() {
        let pdu = TrapPdu {
            request_id: 1,
            varbinds: vec![VarBind::new("1.3".parse().unwrap(), Value::Null)],
        };

        let bytes = encode_v2c_trap("public", &pdu).unwrap();
        let expected: Vec<u8> = vec![
            0x30, 0x1f, // message
            0x02, 0x01, 0x01, // version 2c
            0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
            0xa7, 0x12, // trap pdu
            0x02, 0x01, 0x01, // request-id
            0x02, 0x01, 0x00, // error-status
            0x02, 0x01, 0x00, // error-index
            0x30, 0x07, // varbind list
            0x30, 0x05, 0x06, 0x01, 0x2b, 0x05, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_decode_reads_back_trap_fields() {
        let metric_oid: Oid = "1.3.6.1.4.1.99999.1.1".parse().unwrap();
        let pdu = TrapPdu::new(vec![
            VarBind::uptime(4200),
            VarBind::trap_oid(metric_oid.clone()),
            VarBind::new(
                metric_oid.clone(),
                Value::OctetString(b"CPU load high: 90.00".to_vec()),
            ),
            VarBind::sys_name("db-01"),
        ]);

        let decoded = decode_v2c_trap(&encode_v2c_trap("s3cret", &pdu).unwrap()).unwrap();
        assert_eq!(decoded.version, VERSION_2C);
        assert_eq!(decoded.community, b"s3cret");
        assert_eq!(decoded.pdu, pdu);
        assert_eq!(decoded.pdu.trap_oid(), Some(&metric_oid));
        assert_eq!(decoded.pdu.uptime(), Some(4200));
    }

    #[test]
    fn test_decode_rejects_wrong_pdu_type() {
        // Well-formed GetRequest (0xa0) instead of a trap
        let datagram = [
            0x30, 0x13, 0x02, 0x01, 0x01, 0x04, 0x01, b'x', 0xa0, 0x0b, 0x02, 0x01, 0x01, 0x02,
            0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x00,
        ];
        assert_eq!(decode_v2c_trap(&datagram), Err(CodecError::UnexpectedPdu));
    }

    #[test]
    fn test_decode_rejects_v1_message() {
        // Same trap body under version 0
        let mut datagram = encode_v2c_trap("public", &TrapPdu::new(vec![])).unwrap();
        assert_eq!(&datagram[2..5], &[0x02, 0x01, 0x01]);
        datagram[4] = 0x00;
        assert_eq!(decode_v2c_trap(&datagram), Err(CodecError::UnsupportedVersion));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_v2c_trap(b"not snmp"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_integer_values_survive() {
        let pdu = TrapPdu::new(vec![VarBind::new(
            "1.3.6.1.4.1.99999.2".parse().unwrap(),
            Value::Integer(-129),
        )]);
        let decoded = decode_v2c_trap(&encode_v2c_trap("public", &pdu).unwrap()).unwrap();
        assert_eq!(decoded.pdu.varbinds[0].value, Value::Integer(-129));
    }

    #[test]
    fn test_request_ids_advance() {
        let a = TrapPdu::new(vec![]);
        let b = TrapPdu::new(vec![]);
        assert_ne!(a.request_id, b.request_id);
        assert!(a.request_id >= 0);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::OctetString(b"ok".to_vec()).to_string(), "ok");
        assert_eq!(Value::TimeTicks(12).to_string(), "12");
        assert_eq!(Value::Other("Counter32(5)".to_string()).to_string(), "Counter32(5)");
    }
}
