use std::time::Duration;

use lumen_strip::{Rgb8, Side, StripFrame, StripLayout};

use crate::effect::{Effect, STATIC_INTERVAL};

/// Static per-side colors for checking the side-to-segment mapping.
///
/// Right is green, top is blue, left is red, bottom is magenta.
#[derive(Debug, Clone)]
pub struct CalibrationEffect {
    layout: StripLayout,
}

impl CalibrationEffect {
    pub fn new(layout: StripLayout) -> Self {
        Self { layout }
    }

    /// The color shown on `side`.
    pub fn side_color(side: Side) -> Rgb8 {
        match side {
            Side::Right => Rgb8::GREEN,
            Side::Top => Rgb8::BLUE,
            Side::Left => Rgb8::RED,
            Side::Bottom => Rgb8::MAGENTA,
        }
    }
}

impl Effect for CalibrationEffect {
    fn name(&self) -> &'static str {
        "calibration"
    }

    fn requested_interval(&self) -> Duration {
        STATIC_INTERVAL
    }

    fn next_frame(&mut self) -> Option<StripFrame> {
        let mut frame = StripFrame::new(self.layout);
        for side in Side::ALL {
            frame.side_mut(side).fill(Self::side_color(side));
        }
        Some(frame)
    }
}
