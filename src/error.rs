//! Error types for sync-snmp.
//!
//! A single [`Error`] enum covers I/O failures, BER parse/decode problems,
//! marshalling limits, and protocol-level mismatches. Parse, decode, and
//! marshal errors carry a `Copy` kind enum so callers can match on the exact
//! failure without string comparison.

use std::net::SocketAddr;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Low-level BER parse failures: malformed TLV structure, truncated buffers,
/// integers or subidentifiers that cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Buffer empty where a field was required.
    ZeroLength,
    /// Declared data length exceeds the remaining buffer.
    DataLengthExceedsBuffer { declared: usize, available: usize },
    /// Length encoding uses more octets than the buffer holds.
    TruncatedLength,
    /// Integer field longer than 8 bytes.
    IntegerTooLarge { length: usize },
    /// Base-128 subidentifier exceeds 5 groups (would overflow u32).
    SubidentifierOverflow,
    /// Buffer ended mid-subidentifier (no terminating byte).
    TruncatedSubidentifier,
    /// Outer field of a message is not a SEQUENCE.
    InvalidPacketHeader { tag: u8 },
    /// Expected a different tag at this position.
    UnexpectedTag { expected: u8, actual: u8 },
    /// OID data shorter than the one-byte minimum.
    OidTooShort,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLength => write!(f, "zero-length buffer"),
            Self::DataLengthExceedsBuffer {
                declared,
                available,
            } => {
                write!(
                    f,
                    "data length {} exceeds remaining buffer {}",
                    declared, available
                )
            }
            Self::TruncatedLength => write!(f, "truncated length encoding"),
            Self::IntegerTooLarge { length } => {
                write!(f, "integer too large: {} bytes", length)
            }
            Self::SubidentifierOverflow => write!(f, "base-128 subidentifier overflow"),
            Self::TruncatedSubidentifier => write!(f, "truncated base-128 subidentifier"),
            Self::InvalidPacketHeader { tag } => {
                write!(f, "invalid packet header: tag 0x{:02X}", tag)
            }
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::OidTooShort => write!(f, "OID data too short"),
        }
    }
}

/// Value-level decode failures: structurally valid TLVs whose contents this
/// client does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Tag not in the supported tag table.
    UnknownTag(u8),
    /// BIT STRING values are not supported.
    BitStringUnsupported,
    /// IpAddress payload is not exactly 4 bytes.
    InvalidIpAddressLength { length: usize },
    /// Unknown PDU type in a received message.
    UnknownPduType(u8),
    /// Unknown SNMP version in a received message.
    UnknownVersion(i64),
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTag(tag) => write!(f, "unknown value tag 0x{:02X}", tag),
            Self::BitStringUnsupported => write!(f, "BIT STRING values not supported"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::UnknownPduType(tag) => write!(f, "unknown PDU type: 0x{:02X}", tag),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
        }
    }
}

/// Marshal-side failures while building a request packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarshalErrorKind {
    /// OID has fewer than 2 arcs.
    OidTooShort { arcs: usize },
    /// First arc must be at most 6 for the composite first byte.
    InvalidFirstArc(u32),
    /// Second arc must be below 40 for the composite first byte.
    InvalidSecondArc(u32),
    /// Message exceeds the 127-byte short-form length limit.
    MessageTooLarge { length: usize },
}

impl std::fmt::Display for MarshalErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OidTooShort { arcs } => {
                write!(f, "OID must have at least 2 arcs, got {}", arcs)
            }
            Self::InvalidFirstArc(v) => write!(f, "first OID arc must be 0-6, got {}", v),
            Self::InvalidSecondArc(v) => write!(f, "second OID arc must be below 40, got {}", v),
            Self::MessageTooLarge { length } => {
                write!(
                    f,
                    "message too large for short-form length encoding: {} bytes",
                    length
                )
            }
        }
    }
}

/// The main error type for all sync-snmp operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during network communication. Includes receive timeouts,
    /// which surface as the transport's `WouldBlock`/`TimedOut` io error.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Malformed BER structure in a received packet.
    #[error("parse error at offset {offset}: {kind}")]
    Parse { offset: usize, kind: ParseErrorKind },

    /// Structurally valid field with unsupported or invalid contents.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// Request could not be marshalled.
    #[error("marshal error: {kind}")]
    Marshal { kind: MarshalErrorKind },

    /// Response request ID doesn't match the request.
    #[error("request ID mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i64, actual: i64 },

    /// Response carried no varbinds.
    #[error("no responses: received packet contained an empty varbind list")]
    NoResponses,

    /// Invalid dotted-string OID.
    #[error("invalid OID{}", input.as_deref().map(|s| format!(": {:?}", s)).unwrap_or_default())]
    InvalidOid { input: Option<Box<str>> },

    /// Invalid target address string passed to the builder.
    #[error("invalid target address: {0:?}")]
    InvalidTarget(Box<str>),
}

impl Error {
    /// Create a parse error.
    pub fn parse(offset: usize, kind: ParseErrorKind) -> Self {
        Self::Parse { offset, kind }
    }

    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create a marshal error.
    pub fn marshal(kind: MarshalErrorKind) -> Self {
        Self::Marshal { kind }
    }

    /// Create an I/O error without a known target.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            target: None,
            source,
        }
    }

    /// Create an invalid OID error recording the input string that failed.
    pub fn invalid_oid(input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            input: Some(input.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::io(source)
    }
}
