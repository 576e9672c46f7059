use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Connection;

/// Datagram connection bound to one controller endpoint.
///
/// Each [`Connection::send`] is one datagram of exactly the given length.
pub struct UdpConnection {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpConnection {
    /// Resolve `host:port` and associate a new socket with it.
    ///
    /// The local socket binds `local_port` on the unspecified address of the
    /// remote's family, or an ephemeral port when `None`.
    pub async fn connect(host: &str, port: u16, local_port: Option<u16>) -> Result<Self> {
        let remote = resolve(host, port).await?;
        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, local_port.unwrap_or(0))),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, local_port.unwrap_or(0))),
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::Bind {
                addr: local,
                source,
            })?;
        socket
            .connect(remote)
            .await
            .map_err(|source| TransportError::Connect {
                addr: remote,
                source,
            })?;

        info!(%remote, local = ?socket.local_addr().ok(), "udp connection ready");
        Ok(Self { socket, remote })
    }

    /// The controller endpoint.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }
}

#[async_trait]
impl Connection for UdpConnection {
    async fn send(&self, datagram: Bytes) -> Result<()> {
        let sent = self.socket.send(&datagram).await?;
        debug!(bytes = sent, remote = %self.remote, "datagram sent");
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "udp"
    }
}

impl Drop for UdpConnection {
    fn drop(&mut self) {
        debug!(remote = %self.remote, "closing udp connection");
    }
}

impl std::fmt::Debug for UdpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpConnection")
            .field("remote", &self.remote)
            .finish()
    }
}

/// Receiving end of the datagram link.
pub struct UdpReceiver {
    socket: UdpSocket,
}

impl UdpReceiver {
    /// Bind a socket that accepts datagrams from any sender.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        info!(addr = ?socket.local_addr().ok(), "listening for datagrams");
        Ok(Self { socket })
    }

    /// Receive one datagram into `buf`.
    ///
    /// Datagrams longer than `buf` are truncated by the OS.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await.map_err(Into::into)
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let resolve_error = || TransportError::Resolve {
        host: host.to_string(),
        port,
    };
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| resolve_error())?;
    addrs.next().ok_or_else(resolve_error)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn loopback_receiver() -> UdpReceiver {
        UdpReceiver::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("receiver should bind")
    }

    #[tokio::test]
    async fn test_send_transmits_exact_length() {
        let receiver = loopback_receiver().await;
        let port = receiver.local_addr().unwrap().port();

        let conn = UdpConnection::connect("127.0.0.1", port, None)
            .await
            .expect("connection should open");
        conn.send(Bytes::from_static(b"hello lumen")).await.unwrap();

        let mut buf = [0u8; 1024];
        let (len, from) = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
            .await
            .expect("datagram should arrive")
            .unwrap();
        assert_eq!(&buf[..len], b"hello lumen");
        assert_eq!(from.port(), conn.local_addr().unwrap().port());
    }

    #[tokio::test]
    async fn test_one_datagram_per_send() {
        let receiver = loopback_receiver().await;
        let port = receiver.local_addr().unwrap().port();
        let conn = UdpConnection::connect("127.0.0.1", port, None).await.unwrap();

        conn.send(Bytes::from_static(&[1, 2, 3])).await.unwrap();
        conn.send(Bytes::from_static(&[4, 5])).await.unwrap();

        let mut buf = [0u8; 64];
        let (first, _) = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..first], &[1, 2, 3]);
        let (second, _) = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..second], &[4, 5]);
    }

    #[tokio::test]
    async fn test_explicit_local_port_is_bound() {
        let receiver = loopback_receiver().await;
        let port = receiver.local_addr().unwrap().port();

        let reserved = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
        let free_port = reserved.local_addr().unwrap().port();
        drop(reserved);

        let conn = UdpConnection::connect("127.0.0.1", port, Some(free_port))
            .await
            .unwrap();
        assert_eq!(conn.local_addr().unwrap().port(), free_port);
        assert_eq!(conn.transport_name(), "udp");
    }

    #[tokio::test]
    async fn test_second_bind_on_same_local_port_fails() {
        let receiver = loopback_receiver().await;
        let port = receiver.local_addr().unwrap().port();
        let first = UdpConnection::connect("127.0.0.1", port, None).await.unwrap();
        let taken = first.local_addr().unwrap().port();

        let second = UdpConnection::connect("127.0.0.1", port, Some(taken)).await;
        assert!(matches!(second, Err(TransportError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let result = UdpConnection::connect("host.invalid", 9, None).await;
        assert!(matches!(result, Err(TransportError::Resolve { .. })));
    }
}
