//! Transport abstraction between the host and the LED controller.
//!
//! A [`Connection`] transmits already-encoded messages, one datagram each.
//! Delivery is best effort: no acknowledgement, no retry, no ordering.
//! Receivers rely on the timestamp embedded in every message.
//!
//! [`UdpConnection`] is the network implementation. [`UdpReceiver`] is the
//! receiving end used by test controllers and the `listen` command.

pub mod error;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use traits::Connection;
pub use udp::{UdpConnection, UdpReceiver};
