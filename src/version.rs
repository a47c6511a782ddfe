//! SNMP protocol version.

use crate::error::{DecodeErrorKind, Error, Result};

/// SNMP protocol version carried in the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// SNMPv1 (wire value 0).
    #[default]
    V1,
    /// SNMPv2c (wire value 1).
    V2c,
}

impl Version {
    /// Wire value encoded in the message header INTEGER.
    pub fn wire_value(self) -> i64 {
        match self {
            Self::V1 => 0,
            Self::V2c => 1,
        }
    }

    /// Parse a wire value, rejecting anything this client does not speak.
    pub fn from_wire(value: i64, offset: usize) -> Result<Self> {
        match value {
            0 => Ok(Self::V1),
            1 => Ok(Self::V2c),
            other => Err(Error::decode(offset, DecodeErrorKind::UnknownVersion(other))),
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2c => write!(f, "v2c"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        for v in [Version::V1, Version::V2c] {
            assert_eq!(Version::from_wire(v.wire_value(), 0).unwrap(), v);
        }
    }

    #[test]
    fn rejects_v3_wire_value() {
        assert!(Version::from_wire(3, 5).is_err());
    }
}
