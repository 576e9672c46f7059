use std::time::Duration;

use lumen_strip::{Rgb8, StripFrame, StripLayout};

use crate::effect::{Effect, STATIC_INTERVAL};

/// Every pixel black.
#[derive(Debug, Clone)]
pub struct OffEffect {
    layout: StripLayout,
}

impl OffEffect {
    pub fn new(layout: StripLayout) -> Self {
        Self { layout }
    }
}

impl Effect for OffEffect {
    fn name(&self) -> &'static str {
        "off"
    }

    fn requested_interval(&self) -> Duration {
        STATIC_INTERVAL
    }

    fn next_frame(&mut self) -> Option<StripFrame> {
        Some(StripFrame::new(self.layout))
    }
}

/// Every pixel set to one color.
#[derive(Debug, Clone)]
pub struct SolidEffect {
    layout: StripLayout,
    color: Rgb8,
}

impl SolidEffect {
    pub fn new(layout: StripLayout, color: Rgb8) -> Self {
        Self { layout, color }
    }

    pub fn color(&self) -> Rgb8 {
        self.color
    }
}

impl Effect for SolidEffect {
    fn name(&self) -> &'static str {
        "solid"
    }

    fn requested_interval(&self) -> Duration {
        STATIC_INTERVAL
    }

    fn next_frame(&mut self) -> Option<StripFrame> {
        Some(StripFrame::filled(self.layout, self.color))
    }
}
