// Allow large error types - the Error enum carries kind enums and boxed
// input strings inline for debugging convenience.
#![allow(clippy::result_large_err)]

//! # sync-snmp
//!
//! Synchronous SNMP v1/v2c client library.
//!
//! ## Features
//!
//! - BER codec with strict, panic-free parsing of received packets
//! - GET, GETNEXT, multi-OID GET, and GETBULK over UDP
//! - Lazy subtree traversal with [`Client::walk`] and [`Client::bulk_walk`]
//! - Transport trait with a programmable mock for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sync_snmp::{oid, Client, Version};
//!
//! fn main() -> Result<(), sync_snmp::Error> {
//!     let mut client = Client::builder("192.168.1.1:161")
//!         .community("public")
//!         .version(Version::V2c)
//!         .timeout(Duration::from_secs(5))
//!         .connect()?;
//!
//!     let result = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))?;
//!     println!("sysDescr: {}", result.value);
//!
//!     for vb in client.bulk_walk(20, &oid!(1, 3, 6, 1, 2, 1, 2, 2)) {
//!         println!("{}", vb?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ber;
pub mod client;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

// Re-exports for convenience
pub use client::{BulkWalk, Client, ClientBuilder, ClientConfig, Walk};
pub use error::{DecodeErrorKind, Error, MarshalErrorKind, ParseErrorKind, Result};
pub use message::Message;
pub use oid::Oid;
pub use pdu::PduType;
pub use transport::{MockTransport, ResponseBuilder, Transport, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;

/// Type alias for a client using a dedicated UDP socket.
pub type UdpClient = Client<UdpTransport>;
