use bytes::{Buf, BufMut};
use lumen_strip::Rgb8;
use tracing::trace;

use crate::discriminator::{is_known, EMPTY, KEEP_ALIVE, LED_STATE};
use crate::error::{ProtocolError, Result};
use crate::message::{ControllerMessage, MessageKind, Timestamp};

/// Message header: timestamp (8) + discriminator (2) = 10 bytes.
pub const HEADER_SIZE: usize = 10;

/// Size of the fixed transmission buffer. No datagram is larger.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Encode a message into a caller-supplied buffer.
///
/// Wire format:
/// ```text
/// ┌────────────────┬───────────────┬──────────────────────────────┐
/// │ Timestamp (8B) │ Discriminator │ Payload                      │
/// │ i64 LE, ms     │ (2B LE)       │ KeepAlive: u32 LE duration   │
/// │                │               │ LedState:  u16 LE count,     │
/// │                │               │            count × [R, G, B] │
/// └────────────────┴───────────────┴──────────────────────────────┘
/// ```
///
/// Returns the number of bytes written. On error nothing is written.
pub fn encode_message(message: &ControllerMessage, dst: &mut [u8]) -> Result<usize> {
    if cfg!(target_endian = "big") {
        return Err(ProtocolError::UnsupportedByteOrder);
    }
    if let MessageKind::LedState { pixels } = &message.kind {
        if pixels.len() > usize::from(u16::MAX) {
            return Err(ProtocolError::TooManyPixels {
                count: pixels.len(),
            });
        }
    }

    let needed = message.wire_size();
    let capacity = dst.len();
    if needed > capacity {
        return Err(ProtocolError::BufferOverflow { needed, capacity });
    }

    let mut cursor = &mut dst[..];
    cursor.put_i64_le(message.timestamp.as_millis());
    cursor.put_u16_le(message.kind.discriminator());
    match &message.kind {
        MessageKind::Empty => {}
        MessageKind::KeepAlive { duration_ms } => cursor.put_u32_le(*duration_ms),
        MessageKind::LedState { pixels } => {
            cursor.put_u16_le(pixels.len() as u16);
            for pixel in pixels {
                cursor.put_slice(&pixel.to_array());
            }
        }
    }

    let written = capacity - cursor.remaining_mut();
    debug_assert_eq!(written, needed);
    Ok(written)
}

/// Decode one message from a datagram.
///
/// Trailing bytes after the payload are ignored.
pub fn decode_message(src: &[u8]) -> Result<ControllerMessage> {
    let mut cursor = src;

    ensure_remaining(cursor, HEADER_SIZE)?;
    let timestamp = Timestamp::from_millis(cursor.get_i64_le());
    let discriminator = cursor.get_u16_le();
    if !is_known(discriminator) {
        return Err(ProtocolError::UnknownDiscriminator(discriminator));
    }

    let kind = match discriminator {
        EMPTY => MessageKind::Empty,
        KEEP_ALIVE => {
            ensure_remaining(cursor, 4)?;
            MessageKind::KeepAlive {
                duration_ms: cursor.get_u32_le(),
            }
        }
        LED_STATE => {
            ensure_remaining(cursor, 2)?;
            let count = usize::from(cursor.get_u16_le());
            ensure_remaining(cursor, count * 3)?;
            let pixels = (0..count)
                .map(|_| Rgb8::new(cursor.get_u8(), cursor.get_u8(), cursor.get_u8()))
                .collect();
            MessageKind::LedState { pixels }
        }
        other => return Err(ProtocolError::UnknownDiscriminator(other)),
    };

    if cursor.has_remaining() {
        trace!(extra = cursor.remaining(), "ignoring trailing bytes");
    }
    Ok(ControllerMessage { timestamp, kind })
}

fn ensure_remaining(cursor: &[u8], needed: usize) -> Result<()> {
    let available = cursor.len();
    if available < needed {
        return Err(ProtocolError::Truncated { needed, available });
    }
    Ok(())
}

/// Encodes messages into an owned fixed-size transmission buffer.
pub struct MessageEncoder {
    buf: [u8; MAX_MESSAGE_SIZE],
}

impl MessageEncoder {
    /// Create an encoder with a zeroed buffer.
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_MESSAGE_SIZE],
        }
    }

    /// Encode `message`, returning exactly the bytes to transmit.
    pub fn encode(&mut self, message: &ControllerMessage) -> Result<&[u8]> {
        let written = encode_message(message, &mut self.buf)?;
        Ok(&self.buf[..written])
    }
}

impl Default for MessageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64, kind: MessageKind) -> ControllerMessage {
        ControllerMessage::new(Timestamp::from_millis(millis), kind)
    }

    #[test]
    fn test_keep_alive_layout() {
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let msg = at(0x0102_0304_0506_0708, MessageKind::KeepAlive { duration_ms: 1000 });

        let written = encode_message(&msg, &mut buf).unwrap();

        assert_eq!(written, HEADER_SIZE + 4);
        assert_eq!(
            &buf[..written],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x01, 0x00, 0xE8, 0x03, 0x00, 0x00]
        );
    }

    #[test]
    fn test_led_state_layout() {
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let pixels = vec![Rgb8::new(1, 2, 3), Rgb8::new(4, 5, 6)];
        let msg = at(-1, MessageKind::LedState { pixels });

        let written = encode_message(&msg, &mut buf).unwrap();

        assert_eq!(written, HEADER_SIZE + 2 + 3 * 2);
        assert_eq!(&buf[..8], &[0xFF; 8]);
        assert_eq!(&buf[8..10], &[0x02, 0x00]);
        assert_eq!(&buf[10..12], &[0x02, 0x00]);
        assert_eq!(&buf[12..written], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_led_state_size_formula() {
        let mut encoder = MessageEncoder::new();
        for n in [0usize, 1, 120, 337] {
            let msg = at(5, MessageKind::LedState { pixels: vec![Rgb8::RED; n] });
            assert_eq!(encoder.encode(&msg).unwrap().len(), 10 + 2 + 3 * n);
        }
    }

    #[test]
    fn test_overflow_writes_nothing() {
        let mut buf = [0xAAu8; MAX_MESSAGE_SIZE];
        let msg = at(5, MessageKind::LedState { pixels: vec![Rgb8::WHITE; 338] });

        let err = encode_message(&msg, &mut buf).unwrap_err();

        assert_eq!(
            err,
            ProtocolError::BufferOverflow {
                needed: 10 + 2 + 3 * 338,
                capacity: MAX_MESSAGE_SIZE
            }
        );
        assert!(buf.iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn test_pixel_count_beyond_prefix_rejected() {
        let mut buf = vec![0u8; 300_000];
        let msg = at(5, MessageKind::LedState { pixels: vec![Rgb8::BLACK; 70_000] });
        let err = encode_message(&msg, &mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::TooManyPixels { count: 70_000 }));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let mut encoder = MessageEncoder::new();
        let msg = at(
            1_700_000_000_000,
            MessageKind::LedState {
                pixels: vec![Rgb8::new(30, 60, 90), Rgb8::MAGENTA],
            },
        );
        let decoded = decode_message(encoder.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_empty_kind() {
        let mut wire = Vec::new();
        wire.put_i64_le(42);
        wire.put_u16_le(EMPTY);
        let decoded = decode_message(&wire).unwrap();
        assert_eq!(decoded, at(42, MessageKind::Empty));
    }

    #[test]
    fn test_decode_unknown_discriminator() {
        let mut wire = Vec::new();
        wire.put_i64_le(42);
        wire.put_u16_le(9);
        assert_eq!(
            decode_message(&wire),
            Err(ProtocolError::UnknownDiscriminator(9))
        );
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(
            decode_message(&[0u8; 9]),
            Err(ProtocolError::Truncated { needed: 10, available: 9 })
        ));

        let mut wire = Vec::new();
        wire.put_i64_le(42);
        wire.put_u16_le(LED_STATE);
        wire.put_u16_le(3);
        wire.put_slice(&[1, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(
            decode_message(&wire),
            Err(ProtocolError::Truncated { needed: 9, available: 7 })
        ));
    }
}
