//! Blocking UDP transport.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Receive buffer size, matching the largest datagram this client accepts.
const RECV_BUF_SIZE: usize = 8192;

/// A connected UDP socket with a receive timeout.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Connect to `target`, either `"host"` (port 161) or `"host:port"`.
    pub fn connect(target: &str, timeout: Duration) -> Result<Self> {
        let peer = resolve_target(target)?;
        let bind_addr: SocketAddr = if peer.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(peer)?;
        socket.set_read_timeout(Some(timeout))?;
        tracing::debug!(target: "sync_snmp::transport", %peer, ?timeout, "connected");
        Ok(Self { socket, peer })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "sync_snmp::transport",
            peer = %self.peer,
            len = packet.len(),
            "send"
        );
        self.socket.send(packet).map_err(|source| Error::Io {
            target: Some(self.peer),
            source,
        })?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Bytes> {
        let mut buf = [0u8; RECV_BUF_SIZE];
        let n = self.socket.recv(&mut buf).map_err(|source| Error::Io {
            target: Some(self.peer),
            source,
        })?;
        tracing::trace!(target: "sync_snmp::transport", peer = %self.peer, len = n, "recv");
        Ok(Bytes::copy_from_slice(&buf[..n]))
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}

/// Resolve a target string, defaulting the port to 161 when absent.
fn resolve_target(target: &str) -> Result<SocketAddr> {
    let with_port = target
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next());
    if let Some(addr) = with_port {
        return Ok(addr);
    }
    (target, DEFAULT_PORT)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| Error::InvalidTarget(target.into()))
}
