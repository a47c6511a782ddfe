//! In-memory transport for tests.
//!
//! [`MockTransport`] records every packet the client sends and serves
//! queued responses. Responses are usually described with
//! [`ResponseBuilder`]; the mock fills in the request-id of the most recent
//! request at receive time, so tests don't have to predict generated ids.
//! The builder carries its own BER encoder because responses, unlike
//! requests, hold non-NULL values and may exceed the short-form length
//! limit.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::ber::tag;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::{extract_request_id, Transport};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Shared handle to a programmable transport. Clones share state, so a test
/// can keep one handle for assertions after the client takes the other.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Queued>,
    requests: Vec<Bytes>,
    last_request_id: Option<i64>,
}

#[derive(Debug)]
enum Queued {
    Template(ResponseTemplate),
    Raw(Bytes),
    Io(std::io::ErrorKind),
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a templated response; its request-id is patched from the last
    /// request unless the builder set one explicitly.
    pub fn queue(&self, builder: ResponseBuilder) {
        self.inner
            .lock()
            .unwrap()
            .queue
            .push_back(Queued::Template(builder.template()));
    }

    /// Queue raw bytes, returned exactly as given.
    pub fn queue_raw(&self, packet: impl Into<Bytes>) {
        self.inner
            .lock()
            .unwrap()
            .queue
            .push_back(Queued::Raw(packet.into()));
    }

    /// Queue an I/O failure for the next receive.
    pub fn queue_io_error(&self, kind: std::io::ErrorKind) {
        self.inner.lock().unwrap().queue.push_back(Queued::Io(kind));
    }

    /// All packets sent so far.
    pub fn requests(&self) -> Vec<Bytes> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.last_request_id = extract_request_id(packet);
        inner.requests.push(Bytes::copy_from_slice(packet));
        Ok(())
    }

    fn recv(&mut self) -> Result<Bytes> {
        let mut inner = self.inner.lock().unwrap();
        let request_id = inner.last_request_id.unwrap_or(0);
        match inner.queue.pop_front() {
            Some(Queued::Template(template)) => Ok(template.build(request_id)),
            Some(Queued::Raw(bytes)) => Ok(bytes),
            Some(Queued::Io(kind)) => Err(Error::io(std::io::Error::new(
                kind,
                "mock transport error",
            ))),
            None => Err(Error::io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "no queued response",
            ))),
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

/// Builder for response packets.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    template: ResponseTemplate,
}

/// A response waiting in the mock's queue. `request_id == None` means
/// "echo the id of the last request".
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    version: Version,
    community: Bytes,
    request_id: Option<i64>,
    error_status: i64,
    error_index: i64,
    varbinds: Vec<VarBind>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self {
            template: ResponseTemplate {
                version: Version::V2c,
                community: Bytes::from_static(b"public"),
                request_id: None,
                error_status: 0,
                error_index: 0,
                varbinds: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.template.version = version;
        self
    }

    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.template.community = community.into();
        self
    }

    /// Pin the request-id instead of echoing the request's.
    pub fn request_id(mut self, request_id: i64) -> Self {
        self.template.request_id = Some(request_id);
        self
    }

    pub fn error_status(mut self, status: i64) -> Self {
        self.template.error_status = status;
        self
    }

    pub fn error_index(mut self, index: i64) -> Self {
        self.template.error_index = index;
        self
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.template.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn template(self) -> ResponseTemplate {
        self.template
    }

    /// Encode immediately with an explicit request-id.
    pub fn build(self, request_id: i64) -> Bytes {
        self.template.build(request_id)
    }
}

impl ResponseTemplate {
    /// Encode the response packet. `fallback_id` is used when no explicit
    /// request-id was set.
    ///
    /// # Panics
    ///
    /// Panics if a varbind OID is not encodable (fewer than 2 arcs, or
    /// first-byte arcs out of range).
    pub fn build(&self, fallback_id: i64) -> Bytes {
        let request_id = self.request_id.unwrap_or(fallback_id);

        let mut varbind_list = Vec::new();
        for vb in &self.varbinds {
            let mut one = Vec::new();
            let oid_ber = vb.oid.to_ber().expect("response varbind OID must be encodable");
            encode_tlv(&mut one, tag::OBJECT_IDENTIFIER, &oid_ber);
            encode_value(&mut one, &vb.value);
            encode_tlv(&mut varbind_list, tag::SEQUENCE, &one);
        }

        let mut pdu = Vec::new();
        encode_tlv(&mut pdu, tag::INTEGER, &signed_bytes(request_id));
        encode_tlv(&mut pdu, tag::INTEGER, &signed_bytes(self.error_status));
        encode_tlv(&mut pdu, tag::INTEGER, &signed_bytes(self.error_index));
        encode_tlv(&mut pdu, tag::SEQUENCE, &varbind_list);

        let mut body = Vec::new();
        encode_tlv(&mut body, tag::INTEGER, &signed_bytes(self.version.wire_value()));
        encode_tlv(&mut body, tag::OCTET_STRING, &self.community);
        encode_tlv(&mut body, tag::RESPONSE, &pdu);

        let mut out = Vec::new();
        encode_tlv(&mut out, tag::SEQUENCE, &body);
        Bytes::from(out)
    }
}

fn encode_tlv(out: &mut Vec<u8>, field_tag: u8, content: &[u8]) {
    out.push(field_tag);
    if content.len() < 128 {
        out.push(content.len() as u8);
    } else {
        let be = (content.len() as u64).to_be_bytes();
        let skip = be.iter().take_while(|&&b| b == 0).count();
        out.push(0x80 | (8 - skip) as u8);
        out.extend_from_slice(&be[skip..]);
    }
    out.extend_from_slice(content);
}

/// Minimal two's-complement content octets for a signed integer.
fn signed_bytes(value: i64) -> Vec<u8> {
    let be = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        // Drop a leading byte when it is pure sign fill and the next byte
        // repeats the sign bit.
        let redundant = (be[start] == 0x00 && be[start + 1] & 0x80 == 0)
            || (be[start] == 0xFF && be[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    be[start..].to_vec()
}

/// Minimal content octets for an unsigned integer (decoded unsigned, so no
/// sign padding is needed).
fn unsigned_bytes(value: u64) -> Vec<u8> {
    let be = value.to_be_bytes();
    let skip = be.iter().take_while(|&&b| b == 0).count().min(7);
    be[skip..].to_vec()
}

fn encode_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(v) => encode_tlv(out, tag::INTEGER, &signed_bytes(*v)),
        Value::OctetString(b) => encode_tlv(out, tag::OCTET_STRING, b),
        Value::Null => encode_tlv(out, tag::NULL, &[]),
        Value::ObjectIdentifier(oid) => {
            let ber = oid.to_ber().expect("response varbind OID must be encodable");
            encode_tlv(out, tag::OBJECT_IDENTIFIER, &ber);
        }
        Value::Sequence(b) => encode_tlv(out, tag::SEQUENCE, b),
        Value::IpAddress(octets) => encode_tlv(out, tag::IP_ADDRESS, octets),
        Value::Counter32(v) => encode_tlv(out, tag::COUNTER32, &unsigned_bytes(*v)),
        Value::Gauge32(v) => encode_tlv(out, tag::GAUGE32, &unsigned_bytes(*v)),
        Value::TimeTicks(v) => encode_tlv(out, tag::TIME_TICKS, &signed_bytes(*v)),
        Value::Opaque(b) => encode_tlv(out, tag::OPAQUE, b),
        Value::Counter64(v) => encode_tlv(out, tag::COUNTER64, &unsigned_bytes(*v)),
        Value::EndOfMibView => encode_tlv(out, tag::END_OF_MIB_VIEW, &[]),
        Value::Response(b) => encode_tlv(out, tag::RESPONSE, b),
    }
}
