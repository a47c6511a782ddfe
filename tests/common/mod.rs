//! Shared test support: an in-process agent simulation over a sorted
//! OID table, driven entirely through the `Transport` trait.

use bytes::Bytes;

use sync_snmp::ber::{tag, Decoder};
use sync_snmp::transport::ResponseBuilder;
use sync_snmp::{oid, Error, Oid, Result, Transport, Value};

static INIT: std::sync::Once = std::sync::Once::new();

/// Route client logs through the test harness; set `RUST_LOG` to see them.
#[allow(dead_code)]
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A simulated agent serving a fixed, sorted table of bindings.
///
/// GET answers exact matches, GETNEXT the lexicographic successor, and
/// GETBULK up to `max_repetitions` successors with an `endOfMibView`
/// marker once the table runs out.
pub struct SimAgent {
    table: Vec<(Oid, Value)>,
    pending: Option<Bytes>,
    pub exchanges: usize,
}

#[allow(dead_code)]
impl SimAgent {
    pub fn new(mut table: Vec<(Oid, Value)>) -> Self {
        table.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            table,
            pending: None,
            exchanges: 0,
        }
    }

    /// A small MIB: system group entries, an interface description table,
    /// and one binding past it.
    pub fn with_if_table(interfaces: u32) -> Self {
        let mut table = vec![
            (
                oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                Value::OctetString(Bytes::from_static(b"sim agent")),
            ),
            (oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(101)),
            (
                oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
                Value::OctetString(Bytes::from_static(b"sim-1")),
            ),
        ];
        for i in 1..=interfaces {
            table.push((
                oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, i),
                Value::OctetString(Bytes::from(format!("eth{}", i - 1).into_bytes())),
            ));
            table.push((
                oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, i),
                Value::Counter32(u64::from(i) * 1000),
            ));
        }
        table.push((oid!(1, 3, 6, 1, 2, 1, 4, 1, 0), Value::Integer(1)));
        Self::new(table)
    }

    fn lookup(&self, oid: &Oid) -> Option<&(Oid, Value)> {
        self.table.iter().find(|(o, _)| o == oid)
    }

    fn successor(&self, oid: &Oid) -> Option<&(Oid, Value)> {
        self.table.iter().find(|(o, _)| o > oid)
    }

    fn respond(&self, request: ParsedRequest) -> Bytes {
        let mut builder = ResponseBuilder::new().request_id(request.request_id);
        match request.pdu_tag {
            tag::GET_REQUEST => {
                for oid in &request.oids {
                    match self.lookup(oid) {
                        Some((o, v)) => builder = builder.varbind(o.clone(), v.clone()),
                        None => builder = builder.varbind(oid.clone(), Value::Null),
                    }
                }
            }
            tag::GET_NEXT_REQUEST => {
                for oid in &request.oids {
                    match self.successor(oid) {
                        Some((o, v)) => builder = builder.varbind(o.clone(), v.clone()),
                        None => builder = builder.varbind(oid.clone(), Value::EndOfMibView),
                    }
                }
            }
            tag::GET_BULK_REQUEST => {
                let mut cursor = request.oids[0].clone();
                for _ in 0..request.max_repetitions {
                    match self.successor(&cursor) {
                        Some((o, v)) => {
                            builder = builder.varbind(o.clone(), v.clone());
                            cursor = o.clone();
                        }
                        None => {
                            builder = builder.varbind(cursor.clone(), Value::EndOfMibView);
                            break;
                        }
                    }
                }
            }
            other => panic!("unexpected PDU tag 0x{:02X}", other),
        }
        builder.build(request.request_id)
    }
}

impl Transport for SimAgent {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let request = ParsedRequest::parse(packet);
        self.exchanges += 1;
        self.pending = Some(self.respond(request));
        Ok(())
    }

    fn recv(&mut self) -> Result<Bytes> {
        self.pending.take().ok_or_else(|| {
            Error::io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "no request outstanding",
            ))
        })
    }

    fn peer_addr(&self) -> Option<std::net::SocketAddr> {
        None
    }
}

struct ParsedRequest {
    pdu_tag: u8,
    request_id: i64,
    max_repetitions: i64,
    oids: Vec<Oid>,
}

impl ParsedRequest {
    fn parse(packet: &[u8]) -> Self {
        let mut d = Decoder::new(Bytes::copy_from_slice(packet));
        d.enter_field().expect("outer sequence");
        d.read_integer().expect("version");
        d.read_field().expect("community");
        let pdu = d.enter_field().expect("pdu header");
        let request_id = d.read_integer().expect("request id");
        d.read_integer().expect("error status / non-repeaters");
        let max_repetitions = d.read_integer().expect("error index / max-repetitions");
        d.enter_field().expect("varbind list");
        let mut oids = Vec::new();
        while d.has_remaining() {
            d.enter_field().expect("varbind");
            let at = d.offset();
            let oid_field = d.read_field().expect("oid field");
            oids.push(Oid::from_ber(&oid_field.data, at).expect("oid"));
            d.read_field().expect("value field");
        }
        Self {
            pdu_tag: pdu.tag,
            request_id,
            max_repetitions,
            oids,
        }
    }
}
