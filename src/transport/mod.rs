//! Datagram transports.
//!
//! The client exchanges whole packets through the [`Transport`] trait and
//! never looks at sockets itself. [`UdpTransport`] is the production
//! implementation; [`MockTransport`] is a programmable in-memory one for
//! tests. Receive timeouts belong to the transport: a transport that gives
//! up returns an I/O error and the client propagates it unchanged.

mod mock;
mod udp;

pub use mock::{MockTransport, ResponseBuilder, ResponseTemplate};
pub use udp::UdpTransport;

use std::net::SocketAddr;

use bytes::Bytes;

use crate::error::Result;

/// A connected datagram exchange with one SNMP agent.
pub trait Transport {
    /// Send one request packet.
    fn send(&mut self, packet: &[u8]) -> Result<()>;

    /// Receive one packet, blocking up to the transport's timeout.
    fn recv(&mut self) -> Result<Bytes>;

    /// Address of the agent, if known.
    fn peer_addr(&self) -> Option<SocketAddr>;

    /// Release underlying resources.
    fn close(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Pull the request-id out of a marshalled packet without fully parsing it.
///
/// Walks outer header, version, community, and the PDU header, then reads
/// the request-id integer. Returns `None` for anything malformed. Used by
/// [`MockTransport`] to echo request ids into queued responses.
pub(crate) fn extract_request_id(packet: &[u8]) -> Option<i64> {
    use crate::ber::{int, Decoder};

    let mut d = Decoder::new(Bytes::copy_from_slice(packet));
    d.enter_field().ok()?;
    d.read_field().ok()?; // version
    d.read_field().ok()?; // community
    d.enter_field().ok()?; // PDU, any type
    let at = d.offset();
    let field = d.read_field().ok()?;
    if field.tag != crate::ber::tag::INTEGER {
        return None;
    }
    int::decode_signed(&field.data, at + field.header_len).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::oid;
    use crate::pdu::PduType;
    use crate::version::Version;

    #[test]
    fn extracts_request_id_from_marshalled_request() {
        let msg = Message::request(
            Version::V2c,
            Bytes::from_static(b"public"),
            PduType::GetNextRequest,
            0xBEEF,
            &[oid!(1, 3, 6, 1, 2, 1, 1)],
        );
        let packet = msg.marshal().unwrap();
        assert_eq!(extract_request_id(&packet), Some(0xBEEF));
    }

    #[test]
    fn extract_tolerates_garbage() {
        assert_eq!(extract_request_id(&[]), None);
        assert_eq!(extract_request_id(&[0x30, 0x02, 0x05, 0x00]), None);
        assert_eq!(extract_request_id(b"not a packet at all"), None);
    }
}
