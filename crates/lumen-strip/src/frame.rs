use std::ops::{Index, IndexMut};

use crate::layout::{Side, StripLayout};
use crate::rgb::Rgb8;

/// A full-strip pixel buffer sized by a [`StripLayout`].
///
/// Pixels start black. Frames are built fresh for every sample and handed
/// downstream without further mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripFrame {
    layout: StripLayout,
    leds: Vec<Rgb8>,
}

impl StripFrame {
    /// Create an all-black frame for `layout`.
    pub fn new(layout: StripLayout) -> Self {
        Self::filled(layout, Rgb8::BLACK)
    }

    /// Create a frame with every pixel set to `color`.
    pub fn filled(layout: StripLayout, color: Rgb8) -> Self {
        Self {
            layout,
            leds: vec![color; layout.count()],
        }
    }

    /// The layout this frame was built for.
    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    /// Number of pixels in the frame.
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// True when the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// All pixels in strip order.
    pub fn leds(&self) -> &[Rgb8] {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut [Rgb8] {
        &mut self.leds
    }

    /// Pixels belonging to one side.
    pub fn side(&self, side: Side) -> &[Rgb8] {
        &self.leds[self.layout.range(side)]
    }

    /// Mutable pixels belonging to one side.
    pub fn side_mut(&mut self, side: Side) -> &mut [Rgb8] {
        let range = self.layout.range(side);
        &mut self.leds[range]
    }

    /// Consume the frame, keeping only the pixel buffer.
    pub fn into_leds(self) -> Vec<Rgb8> {
        self.leds
    }
}

impl Index<usize> for StripFrame {
    type Output = Rgb8;

    fn index(&self, index: usize) -> &Rgb8 {
        &self.leds[index]
    }
}

impl IndexMut<usize> for StripFrame {
    fn index_mut(&mut self, index: usize) -> &mut Rgb8 {
        &mut self.leds[index]
    }
}
