//! SNMP value types and their decoder.

use bytes::Bytes;

use crate::ber::tag;
use crate::ber::int;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// A decoded SNMP value.
///
/// Decoding is a strict tag table: every supported tag maps to exactly one
/// variant, and any unsupported tag is a decode error rather than a
/// catch-all raw variant. Counters and gauges decode through the unsigned
/// path (at most the first 8 content octets contribute); TimeTicks decodes
/// through the signed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// INTEGER (0x02).
    Integer(i64),
    /// OCTET STRING (0x04).
    OctetString(Bytes),
    /// NULL (0x05).
    Null,
    /// OBJECT IDENTIFIER (0x06).
    ObjectIdentifier(Oid),
    /// SEQUENCE (0x30), passed through raw.
    Sequence(Bytes),
    /// IpAddress (0x40), exactly 4 octets.
    IpAddress([u8; 4]),
    /// Counter32 (0x41).
    Counter32(u64),
    /// Gauge32 (0x42).
    Gauge32(u64),
    /// TimeTicks (0x43), hundredths of a second.
    TimeTicks(i64),
    /// Opaque (0x44), passed through raw.
    Opaque(Bytes),
    /// Counter64 (0x46).
    Counter64(u64),
    /// endOfMibView exception (0x82), terminates bulk walks.
    EndOfMibView,
    /// Response PDU (0xA2) appearing in value position, passed through raw.
    Response(Bytes),
}

impl Value {
    /// Decode content octets for a given tag. `offset` is the buffer
    /// position of the content, used for error reporting.
    pub fn decode(value_tag: u8, data: Bytes, offset: usize) -> Result<Self> {
        match value_tag {
            tag::INTEGER => Ok(Self::Integer(int::decode_signed(&data, offset)?)),
            tag::OCTET_STRING => Ok(Self::OctetString(data)),
            tag::NULL => Ok(Self::Null),
            tag::OBJECT_IDENTIFIER => Ok(Self::ObjectIdentifier(Oid::from_ber(&data, offset)?)),
            tag::SEQUENCE => Ok(Self::Sequence(data)),
            tag::IP_ADDRESS => {
                if data.len() != 4 {
                    tracing::debug!(
                        target: "sync_snmp::value",
                        offset,
                        len = data.len(),
                        "bad IpAddress length"
                    );
                    return Err(Error::decode(
                        offset,
                        DecodeErrorKind::InvalidIpAddressLength { length: data.len() },
                    ));
                }
                Ok(Self::IpAddress([data[0], data[1], data[2], data[3]]))
            }
            tag::COUNTER32 => Ok(Self::Counter32(int::decode_unsigned_truncated(&data))),
            tag::GAUGE32 => Ok(Self::Gauge32(int::decode_unsigned_truncated(&data))),
            tag::TIME_TICKS => Ok(Self::TimeTicks(int::decode_signed(&data, offset)?)),
            tag::OPAQUE => Ok(Self::Opaque(data)),
            tag::COUNTER64 => Ok(Self::Counter64(int::decode_unsigned_truncated(&data))),
            tag::END_OF_MIB_VIEW => Ok(Self::EndOfMibView),
            tag::RESPONSE => Ok(Self::Response(data)),
            tag::BIT_STRING => {
                tracing::debug!(target: "sync_snmp::value", offset, "BIT STRING value");
                Err(Error::decode(offset, DecodeErrorKind::BitStringUnsupported))
            }
            other => {
                tracing::debug!(target: "sync_snmp::value", offset, tag = other, "unknown value tag");
                Err(Error::decode(offset, DecodeErrorKind::UnknownTag(other)))
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) | Self::TimeTicks(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Counter32(v) | Self::Gauge32(v) | Self::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::OctetString(b) | Self::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// OCTET STRING content as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::OctetString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Self::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn is_end_of_mib_view(&self) -> bool {
        matches!(self, Self::EndOfMibView)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::OctetString(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => {
                    for byte in b.iter() {
                        write!(f, "{:02x}", byte)?;
                    }
                    Ok(())
                }
            },
            Self::Null => write!(f, "null"),
            Self::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Self::Sequence(b) => write!(f, "sequence({} bytes)", b.len()),
            Self::IpAddress(octets) => write!(
                f,
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            ),
            Self::Counter32(v) => write!(f, "{}", v),
            Self::Gauge32(v) => write!(f, "{}", v),
            Self::TimeTicks(v) => write!(f, "{}", v),
            Self::Opaque(b) => write!(f, "opaque({} bytes)", b.len()),
            Self::Counter64(v) => write!(f, "{}", v),
            Self::EndOfMibView => write!(f, "endOfMibView"),
            Self::Response(b) => write!(f, "response({} bytes)", b.len()),
        }
    }
}
