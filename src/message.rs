//! SNMP message model: marshalling of requests and unmarshalling of
//! received packets.
//!
//! The wire layout is the classic community-based message:
//!
//! ```text
//! SEQUENCE {
//!   INTEGER      version
//!   OCTET STRING community
//!   PDU {
//!     INTEGER request-id        (always 4 content octets on send)
//!     INTEGER error-status      (non-repeaters for GETBULK)
//!     INTEGER error-index       (max-repetitions for GETBULK)
//!     SEQUENCE varbind-list
//!   }
//! }
//! ```
//!
//! Marshalling builds the buffer forward, reserving the PDU and
//! varbind-list length bytes and patching them once the varbinds are in
//! place. All length fields use the short form, which caps a request at
//! 127 bytes of message data; larger requests fail with a marshal error
//! instead of producing an unparseable packet.

use bytes::Bytes;

use crate::ber::{tag, Decoder};
use crate::error::{Error, MarshalErrorKind, ParseErrorKind, Result};
use crate::oid::Oid;
use crate::pdu::PduType;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Fixed bytes between the PDU length byte and the varbind list: request-id
/// TLV (6), two 1-byte integer TLVs (6), varbind-list header (2).
const PDU_FIXED_LEN: u8 = 14;

/// One SNMP message, request or response.
#[derive(Debug, Clone)]
pub struct Message {
    pub version: Version,
    pub community: Bytes,
    pub pdu_type: PduType,
    pub request_id: i64,
    /// errorStatus, or nonRepeaters for GETBULK requests.
    pub error_status: i64,
    /// errorIndex, or maxRepetitions for GETBULK requests.
    pub error_index: i64,
    pub varbinds: Vec<VarBind>,
}

impl Message {
    /// Build a GET / GETNEXT style request with NULL-valued varbinds.
    pub fn request(
        version: Version,
        community: Bytes,
        pdu_type: PduType,
        request_id: i64,
        oids: &[Oid],
    ) -> Self {
        Self {
            version,
            community,
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// Build a GETBULK request. Non-repeaters and max-repetitions ride in
    /// the error-status and error-index positions.
    pub fn bulk_request(
        version: Version,
        community: Bytes,
        request_id: i64,
        non_repeaters: u8,
        max_repetitions: u8,
        oids: &[Oid],
    ) -> Self {
        Self {
            version,
            community,
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: i64::from(non_repeaters),
            error_index: i64::from(max_repetitions),
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// Encode this message to wire bytes.
    ///
    /// Request varbinds are always encoded with NULL values. The two
    /// per-PDU counters (error-status/error-index or the GETBULK pair)
    /// are encoded as single-byte integers.
    pub fn marshal(&self) -> Result<Bytes> {
        // Encode varbinds first so the total size can be validated before
        // any length byte is written.
        let mut varbind_buf: Vec<u8> = Vec::new();
        for vb in &self.varbinds {
            let oid_ber = vb.oid.to_ber()?;
            varbind_buf.push(tag::SEQUENCE);
            varbind_buf.push((oid_ber.len() + 4) as u8);
            varbind_buf.push(tag::OBJECT_IDENTIFIER);
            varbind_buf.push(oid_ber.len() as u8);
            varbind_buf.extend_from_slice(&oid_ber);
            varbind_buf.push(tag::NULL);
            varbind_buf.push(0x00);
        }
        let pdu_len = varbind_buf.len();
        // version TLV (3) + community header (2) + PDU header (2) +
        // PDU fixed bytes + varbinds.
        let data_len = pdu_len + usize::from(PDU_FIXED_LEN) + self.community.len() + 7;
        if data_len >= 128 {
            tracing::debug!(
                target: "sync_snmp::message",
                data_len,
                varbinds = self.varbinds.len(),
                "request exceeds short-form limit"
            );
            return Err(Error::marshal(MarshalErrorKind::MessageTooLarge {
                length: data_len,
            }));
        }

        let mut buf: Vec<u8> = Vec::with_capacity(data_len + 2);
        buf.push(tag::SEQUENCE);
        buf.push(data_len as u8);
        buf.extend_from_slice(&[tag::INTEGER, 0x01, self.version.wire_value() as u8]);
        buf.push(tag::OCTET_STRING);
        buf.push(self.community.len() as u8);
        buf.extend_from_slice(&self.community);

        buf.push(self.pdu_type.tag());
        buf.push(pdu_len as u8 + PDU_FIXED_LEN);
        buf.extend_from_slice(&[tag::INTEGER, 0x04]);
        buf.extend_from_slice(&(self.request_id as u32).to_be_bytes());
        buf.extend_from_slice(&[tag::INTEGER, 0x01, self.error_status as u8]);
        buf.extend_from_slice(&[tag::INTEGER, 0x01, self.error_index as u8]);
        buf.push(tag::SEQUENCE);
        buf.push(pdu_len as u8);
        buf.extend_from_slice(&varbind_buf);
        Ok(Bytes::from(buf))
    }

    /// Decode a received packet.
    ///
    /// The reader is a single forward cursor: outer sequence, version,
    /// community, PDU header, three integers, then varbinds until the
    /// buffer is exhausted. Any malformed field aborts the whole packet.
    pub fn unmarshal(packet: Bytes) -> Result<Self> {
        if packet.is_empty() {
            return Err(Error::parse(0, ParseErrorKind::ZeroLength));
        }
        if packet[0] != tag::SEQUENCE {
            tracing::debug!(
                target: "sync_snmp::message",
                tag = packet[0],
                "packet does not start with a sequence"
            );
            return Err(Error::parse(
                0,
                ParseErrorKind::InvalidPacketHeader { tag: packet[0] },
            ));
        }
        let len = packet.len();
        tracing::trace!(target: "sync_snmp::message", len, "unmarshalling packet");
        let mut d = Decoder::new(packet);
        d.enter_field()?;

        let version_at = d.offset();
        let version = Version::from_wire(d.read_integer()?, version_at)?;
        let community = d.expect_field(tag::OCTET_STRING)?.data;

        let pdu_at = d.offset();
        let pdu_hdr = d.enter_field()?;
        let pdu_type = PduType::from_tag(pdu_hdr.tag, pdu_at)?;

        let request_id = d.read_integer()?;
        let error_status = d.read_integer()?;
        let error_index = d.read_integer()?;
        tracing::trace!(
            target: "sync_snmp::message",
            %pdu_type,
            request_id,
            error_status,
            error_index,
            "parsed PDU header"
        );

        let list_at = d.offset();
        let list_hdr = d.enter_field()?;
        if list_hdr.tag != tag::SEQUENCE {
            return Err(Error::parse(
                list_at,
                ParseErrorKind::UnexpectedTag {
                    expected: tag::SEQUENCE,
                    actual: list_hdr.tag,
                },
            ));
        }

        let mut varbinds = Vec::new();
        while d.has_remaining() {
            let vb_at = d.offset();
            let vb_hdr = d.enter_field()?;
            if vb_hdr.tag != tag::SEQUENCE {
                return Err(Error::parse(
                    vb_at,
                    ParseErrorKind::UnexpectedTag {
                        expected: tag::SEQUENCE,
                        actual: vb_hdr.tag,
                    },
                ));
            }
            let oid_at = d.offset();
            let oid_field = d.expect_field(tag::OBJECT_IDENTIFIER)?;
            let oid = Oid::from_ber(&oid_field.data, oid_at + oid_field.header_len)?;
            let value_at = d.offset();
            let value_field = d.read_field()?;
            let value = Value::decode(
                value_field.tag,
                value_field.data,
                value_at + value_field.header_len,
            )?;
            varbinds.push(VarBind::new(oid, value));
        }
        tracing::trace!(
            target: "sync_snmp::message",
            varbinds = varbinds.len(),
            "unmarshal complete"
        );

        Ok(Self {
            version,
            community,
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} request_id={} error={}({}) varbinds={}",
            self.version,
            self.pdu_type,
            self.request_id,
            self.error_status,
            self.error_index,
            self.varbinds.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn get_request(oids: &[Oid]) -> Message {
        Message::request(
            Version::V1,
            Bytes::from_static(b"public"),
            PduType::GetRequest,
            0x0102_0304,
            oids,
        )
    }

    #[test]
    fn marshal_known_get() {
        let bytes = get_request(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)])
            .marshal()
            .unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x30, 41,
            0x02, 0x01, 0x00,                               // version v1
            0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
            0xA0, 28,                                       // GetRequest PDU
            0x02, 0x04, 0x01, 0x02, 0x03, 0x04,             // request id
            0x02, 0x01, 0x00,                               // error status
            0x02, 0x01, 0x00,                               // error index
            0x30, 14,                                       // varbind list
            0x30, 12,
            0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00,
            0x05, 0x00,
        ];
        assert_eq!(&bytes[..], expected);
    }

    #[test]
    fn marshal_bulk_carries_repetition_counts() {
        let msg = Message::bulk_request(
            Version::V2c,
            Bytes::from_static(b"public"),
            7,
            0,
            20,
            &[oid!(1, 3, 6, 1, 2, 1, 2)],
        );
        let bytes = msg.marshal().unwrap();
        assert_eq!(bytes[13], 0xA5);
        // Bytes in the error-status / error-index positions.
        assert_eq!(bytes[23], 0);
        assert_eq!(bytes[26], 20);
    }

    #[test]
    fn marshal_rejects_oversize_message() {
        let oids: Vec<Oid> = (0..12).map(|i| oid!(1, 3, 6, 1, 2, 1, 1, i, 0)).collect();
        let err = get_request(&oids).marshal().unwrap_err();
        assert!(matches!(
            err,
            Error::Marshal {
                kind: MarshalErrorKind::MessageTooLarge { .. }
            }
        ));
    }

    #[test]
    fn marshal_unmarshal_round_trip() {
        let bytes = get_request(&[oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)])
            .marshal()
            .unwrap();
        let msg = Message::unmarshal(bytes).unwrap();
        assert_eq!(msg.version, Version::V1);
        assert_eq!(&msg.community[..], b"public");
        assert_eq!(msg.pdu_type, PduType::GetRequest);
        assert_eq!(msg.request_id, 0x0102_0304);
        assert_eq!(msg.varbinds.len(), 1);
        assert_eq!(msg.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
        assert_eq!(msg.varbinds[0].value, Value::Null);
    }

    #[test]
    fn unmarshal_rejects_non_sequence_header() {
        let err = Message::unmarshal(Bytes::from_static(&[0x02, 0x01, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                offset: 0,
                kind: ParseErrorKind::InvalidPacketHeader { tag: 0x02 }
            }
        ));
    }

    #[test]
    fn unmarshal_rejects_empty_packet() {
        assert!(matches!(
            Message::unmarshal(Bytes::new()).unwrap_err(),
            Error::Parse {
                kind: ParseErrorKind::ZeroLength,
                ..
            }
        ));
    }

    #[test]
    fn unmarshal_truncated_packet_fails_cleanly() {
        let full = get_request(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)])
            .marshal()
            .unwrap();
        for cut in 1..full.len() {
            assert!(
                Message::unmarshal(full.slice(..cut)).is_err(),
                "prefix of {} bytes should not parse",
                cut
            );
        }
    }

    #[test]
    fn unmarshal_response_with_values() {
        // Response carrying sysName = "router1".
        #[rustfmt::skip]
        let packet: &[u8] = &[
            0x30, 48,
            0x02, 0x01, 0x01,
            0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c',
            0xA2, 35,
            0x02, 0x04, 0x00, 0x00, 0x12, 0x34,
            0x02, 0x01, 0x00,
            0x02, 0x01, 0x00,
            0x30, 21,
            0x30, 19,
            0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x05, 0x00,
            0x04, 0x07, b'r', b'o', b'u', b't', b'e', b'r', b'1',
        ];
        let msg = Message::unmarshal(Bytes::copy_from_slice(packet)).unwrap();
        assert_eq!(msg.pdu_type, PduType::Response);
        assert_eq!(msg.request_id, 0x1234);
        assert_eq!(msg.varbinds.len(), 1);
        assert_eq!(msg.varbinds[0].value.as_str(), Some("router1"));
    }

    #[test]
    fn unmarshal_unknown_pdu_type() {
        #[rustfmt::skip]
        let packet: &[u8] = &[
            0x30, 13,
            0x02, 0x01, 0x00,
            0x04, 0x02, b'p', b'b',
            0xA4, 4, // Trap, unsupported
            0x02, 0x02, 0x00, 0x01,
        ];
        let err = Message::unmarshal(Bytes::copy_from_slice(packet)).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: crate::error::DecodeErrorKind::UnknownPduType(0xA4),
                ..
            }
        ));
    }
}
