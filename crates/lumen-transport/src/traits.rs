use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A link to one LED controller.
///
/// Implementations transmit each datagram exactly as given. Transport
/// resources are released when the connection is dropped.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Transmit one encoded message.
    async fn send(&self, datagram: Bytes) -> Result<()>;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str;
}
