use std::time::{SystemTime, UNIX_EPOCH};

use lumen_strip::Rgb8;

use crate::discriminator::{EMPTY, KEEP_ALIVE, LED_STATE};

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a raw millisecond count.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The current wall-clock time.
    ///
    /// Clocks set before the epoch yield negative values.
    pub fn now() -> Self {
        let millis = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_millis())
                .map(|ms| -ms)
                .unwrap_or(i64::MIN),
        };
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

/// Payload variants. The discriminator of each is fixed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// No payload.
    Empty,
    /// The stream stays alive for `duration_ms` after this message.
    KeepAlive { duration_ms: u32 },
    /// Pixel colors in strip order (right, top, left, bottom).
    LedState { pixels: Vec<Rgb8> },
}

impl MessageKind {
    /// Wire discriminator of this kind.
    pub fn discriminator(&self) -> u16 {
        match self {
            MessageKind::Empty => EMPTY,
            MessageKind::KeepAlive { .. } => KEEP_ALIVE,
            MessageKind::LedState { .. } => LED_STATE,
        }
    }

    /// Encoded payload size, excluding the header.
    pub fn payload_size(&self) -> usize {
        match self {
            MessageKind::Empty => 0,
            MessageKind::KeepAlive { .. } => 4,
            MessageKind::LedState { pixels } => 2 + 3 * pixels.len(),
        }
    }
}

/// A timestamped controller message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMessage {
    pub timestamp: Timestamp,
    pub kind: MessageKind,
}

impl ControllerMessage {
    /// Create a message with an explicit timestamp.
    pub fn new(timestamp: Timestamp, kind: MessageKind) -> Self {
        Self { timestamp, kind }
    }

    /// A keepalive stamped with the current time.
    pub fn keep_alive(duration_ms: u32) -> Self {
        Self::new(Timestamp::now(), MessageKind::KeepAlive { duration_ms })
    }

    /// A LED state stamped with the current time.
    pub fn led_state(pixels: Vec<Rgb8>) -> Self {
        Self::new(Timestamp::now(), MessageKind::LedState { pixels })
    }

    /// The total wire size of this message (header + payload).
    pub fn wire_size(&self) -> usize {
        crate::codec::HEADER_SIZE + self.kind.payload_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn wire_sizes_match_layout() {
        assert_eq!(ControllerMessage::keep_alive(1000).wire_size(), 10 + 4);
        let pixels = vec![Rgb8::WHITE; 5];
        assert_eq!(ControllerMessage::led_state(pixels).wire_size(), 10 + 2 + 15);
        let empty = ControllerMessage::new(Timestamp::from_millis(0), MessageKind::Empty);
        assert_eq!(empty.wire_size(), 10);
    }
}
