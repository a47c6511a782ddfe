//! Synchronous SNMP client.
//!
//! One [`Client`] talks to one agent through a [`Transport`], with a single
//! request in flight at a time. The client owns no retry or timeout policy:
//! a transport that gives up waiting returns an I/O error, which is
//! propagated to the caller unchanged.
//!
//! ```no_run
//! use std::time::Duration;
//! use sync_snmp::{oid, Client};
//!
//! # fn main() -> sync_snmp::Result<()> {
//! let mut client = Client::builder("192.0.2.10")
//!     .community("public")
//!     .timeout(Duration::from_secs(2))
//!     .connect()?;
//!
//! let sys_descr = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))?;
//! println!("{}", sys_descr);
//!
//! for vb in client.walk(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)) {
//!     println!("{}", vb?);
//! }
//! # Ok(())
//! # }
//! ```

mod walk;

pub use walk::{BulkWalk, Walk};

use std::time::Duration;

use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::message::Message;
use crate::oid::Oid;
use crate::pdu::PduType;
use crate::transport::{Transport, UdpTransport};
use crate::varbind::VarBind;
use crate::version::Version;

/// Client configuration shared by all transports.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub version: Version,
    pub community: Bytes,
    /// Seed for request-id generation. Unseeded clients draw from OS
    /// entropy; tests seed this to make request ids reproducible.
    pub request_id_seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::V1,
            community: Bytes::from_static(b"public"),
            request_id_seed: None,
        }
    }
}

/// A synchronous SNMP v1/v2c client.
#[derive(Debug)]
pub struct Client<T: Transport> {
    transport: T,
    version: Version,
    community: Bytes,
    rng: SmallRng,
}

impl Client<UdpTransport> {
    /// Start building a UDP client for `target` (`"host"` or
    /// `"host:port"`, port defaulting to 161).
    pub fn builder(target: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            target: target.into(),
            config: ClientConfig::default(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over an existing transport.
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        let rng = match config.request_id_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            transport,
            version: config.version,
            community: config.community,
            rng,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET a single OID.
    pub fn get(&mut self, oid: &Oid) -> Result<VarBind> {
        self.request_first(PduType::GetRequest, oid)
    }

    /// GETNEXT: the first binding lexicographically after `oid`.
    pub fn get_next(&mut self, oid: &Oid) -> Result<VarBind> {
        self.request_first(PduType::GetNextRequest, oid)
    }

    /// GET several OIDs in one PDU.
    pub fn get_many(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        Ok(self.request(PduType::GetRequest, oids)?.varbinds)
    }

    /// One request/response exchange returning the full response message,
    /// for callers that need the agent's error-status and error-index.
    pub fn request(&mut self, pdu_type: PduType, oids: &[Oid]) -> Result<Message> {
        let request_id = self.next_request_id();
        let msg = Message::request(self.version, self.community.clone(), pdu_type, request_id, oids);
        self.send_and_recv(&msg)
    }

    /// Single GETBULK exchange, returning the whole batch.
    pub fn get_bulk(
        &mut self,
        non_repeaters: u8,
        max_repetitions: u8,
        oids: &[Oid],
    ) -> Result<Vec<VarBind>> {
        let request_id = self.next_request_id();
        let msg = Message::bulk_request(
            self.version,
            self.community.clone(),
            request_id,
            non_repeaters,
            max_repetitions,
            oids,
        );
        Ok(self.send_and_recv(&msg)?.varbinds)
    }

    /// Walk the subtree under `root` with repeated GETNEXT requests.
    ///
    /// The iterator is lazy; each `next()` may perform one exchange.
    /// Errors are yielded as items, so bindings collected before a failure
    /// are not lost.
    pub fn walk(&mut self, root: &Oid) -> Walk<'_, T> {
        Walk::new(self, root.clone())
    }

    /// Walk the subtree under `root` with GETBULK batches.
    pub fn bulk_walk(&mut self, max_repetitions: u8, root: &Oid) -> BulkWalk<'_, T> {
        BulkWalk::new(self, root.clone(), max_repetitions)
    }

    /// Consume the client and close its transport.
    pub fn close(self) -> Result<()> {
        self.transport.close()
    }

    fn request_first(&mut self, pdu_type: PduType, oid: &Oid) -> Result<VarBind> {
        let mut response = self.request(pdu_type, std::slice::from_ref(oid))?;
        Ok(response.varbinds.swap_remove(0))
    }

    /// One request/response exchange with response validation.
    fn send_and_recv(&mut self, msg: &Message) -> Result<Message> {
        let packet = msg.marshal()?;
        tracing::debug!(
            target: "sync_snmp::client",
            pdu = %msg.pdu_type,
            request_id = msg.request_id,
            varbinds = msg.varbinds.len(),
            "sending request"
        );
        self.transport.send(&packet)?;
        let response = Message::unmarshal(self.transport.recv()?)?;
        if response.varbinds.is_empty() {
            tracing::debug!(
                target: "sync_snmp::client",
                request_id = msg.request_id,
                "response carried no varbinds"
            );
            return Err(Error::NoResponses);
        }
        if response.request_id != msg.request_id {
            tracing::debug!(
                target: "sync_snmp::client",
                expected = msg.request_id,
                actual = response.request_id,
                "request id mismatch"
            );
            return Err(Error::RequestIdMismatch {
                expected: msg.request_id,
                actual: response.request_id,
            });
        }
        tracing::debug!(
            target: "sync_snmp::client",
            request_id = response.request_id,
            varbinds = response.varbinds.len(),
            error_status = response.error_status,
            "received response"
        );
        Ok(response)
    }

    fn next_request_id(&mut self) -> i64 {
        self.rng.gen_range(0..65536)
    }
}

/// Builder for UDP-backed clients.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    target: String,
    config: ClientConfig,
    timeout: Duration,
}

impl ClientBuilder {
    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.config.community = community.into();
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.config.version = version;
        self
    }

    /// Receive timeout handed to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Seed request-id generation, for reproducible packets in tests.
    pub fn request_id_seed(mut self, seed: u64) -> Self {
        self.config.request_id_seed = Some(seed);
        self
    }

    pub fn connect(self) -> Result<Client<UdpTransport>> {
        let transport = UdpTransport::connect(&self.target, self.timeout)?;
        Ok(Client::with_transport(transport, self.config))
    }
}
