use std::collections::HashMap;

use tracing::debug;

use crate::discriminator::discriminator_name;
use crate::message::{ControllerMessage, Timestamp};

/// Drops messages that arrive out of order.
///
/// The transport may reorder datagrams. A message is accepted only when its
/// timestamp is strictly newer than the last accepted one of the same kind.
/// Kinds are tracked independently.
#[derive(Debug, Clone, Default)]
pub struct FreshnessFilter {
    latest: HashMap<u16, Timestamp>,
}

impl FreshnessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` and return whether it is fresh.
    pub fn accept(&mut self, message: &ControllerMessage) -> bool {
        let kind = message.kind.discriminator();
        match self.latest.get(&kind) {
            Some(latest) if *latest >= message.timestamp => {
                debug!(
                    kind = discriminator_name(kind),
                    timestamp = message.timestamp.as_millis(),
                    latest = latest.as_millis(),
                    "discarding stale message"
                );
                false
            }
            _ => {
                self.latest.insert(kind, message.timestamp);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lumen_strip::Rgb8;

    use super::*;
    use crate::message::MessageKind;

    fn keep_alive(ms: i64) -> ControllerMessage {
        ControllerMessage::new(
            Timestamp::from_millis(ms),
            MessageKind::KeepAlive { duration_ms: 1000 },
        )
    }

    fn led_state(ms: i64) -> ControllerMessage {
        ControllerMessage::new(
            Timestamp::from_millis(ms),
            MessageKind::LedState {
                pixels: vec![Rgb8::WHITE],
            },
        )
    }

    #[test]
    fn rejects_older_and_equal_timestamps() {
        let mut filter = FreshnessFilter::new();
        assert!(filter.accept(&keep_alive(10)));
        assert!(!filter.accept(&keep_alive(10)));
        assert!(!filter.accept(&keep_alive(9)));
        assert!(filter.accept(&keep_alive(11)));
    }

    #[test]
    fn kinds_are_independent() {
        let mut filter = FreshnessFilter::new();
        assert!(filter.accept(&keep_alive(100)));
        assert!(filter.accept(&led_state(50)));
        assert!(!filter.accept(&led_state(50)));
        assert!(filter.accept(&keep_alive(101)));
    }
}
