/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The encoded message does not fit the transmission buffer.
    #[error("message too large ({needed} bytes, buffer holds {capacity})")]
    BufferOverflow { needed: usize, capacity: usize },

    /// The wire format is little-endian only.
    #[error("big-endian hosts are not supported")]
    UnsupportedByteOrder,

    /// The pixel count does not fit the 16-bit length prefix.
    #[error("too many pixels for one message ({count}, max {})", u16::MAX)]
    TooManyPixels { count: usize },

    /// The input ended before a complete message was read.
    #[error("truncated message (needed {needed} more bytes, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// The discriminator does not name a known message kind.
    #[error("unknown message discriminator {0}")]
    UnknownDiscriminator(u16),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
