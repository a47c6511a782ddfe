//! PDU type tags.

use crate::ber::tag;
use crate::error::{DecodeErrorKind, Error, Result};

/// SNMP PDU types this client sends or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::GET_REQUEST,
    GetNextRequest = tag::GET_NEXT_REQUEST,
    Response = tag::RESPONSE,
    GetBulkRequest = tag::GET_BULK_REQUEST,
}

impl PduType {
    /// BER tag byte for this PDU type.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a received PDU tag. Only GetRequest, Response, and
    /// GetBulkRequest are accepted on the receive path.
    pub fn from_tag(tag: u8, offset: usize) -> Result<Self> {
        match tag {
            tag::GET_REQUEST => Ok(Self::GetRequest),
            tag::RESPONSE => Ok(Self::Response),
            tag::GET_BULK_REQUEST => Ok(Self::GetBulkRequest),
            other => Err(Error::decode(offset, DecodeErrorKind::UnknownPduType(other))),
        }
    }

}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetRequest => "GetRequest",
            Self::GetNextRequest => "GetNextRequest",
            Self::Response => "Response",
            Self::GetBulkRequest => "GetBulkRequest",
        };
        write!(f, "{}", name)
    }
}
