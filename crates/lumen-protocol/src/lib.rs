//! Binary wire protocol between the lumen host and the LED controller.
//!
//! Every message is one self-contained datagram:
//! - An 8-byte little-endian signed timestamp (milliseconds since the Unix epoch)
//! - A 2-byte little-endian discriminator selecting the payload kind
//! - The payload
//!
//! No message exceeds [`MAX_MESSAGE_SIZE`]. Messages that would are rejected
//! before any byte is written.

pub mod codec;
pub mod discriminator;
pub mod error;
pub mod freshness;
pub mod message;

pub use codec::{decode_message, encode_message, MessageEncoder, HEADER_SIZE, MAX_MESSAGE_SIZE};
pub use discriminator::{discriminator_name, EMPTY, KEEP_ALIVE, LED_STATE};
pub use error::{ProtocolError, Result};
pub use freshness::FreshnessFilter;
pub use message::{ControllerMessage, MessageKind, Timestamp};
