use std::collections::VecDeque;

use lumen_strip::{Rgb8, StripFrame};

/// Ring of the most recent frames, blended by age.
///
/// The ring starts empty and holds at most `window` frames. A frame `k`
/// steps back from the newest weighs `window - k`.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    window: usize,
    frames: VecDeque<StripFrame>,
}

impl FrameHistory {
    /// A window of 0 behaves like 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            frames: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push `frame` as the newest entry, evicting the oldest when full.
    pub fn push(&mut self, frame: StripFrame) {
        if self.frames.len() == self.window {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Weighted average over every frame in the ring.
    pub fn weighted_average(&self) -> Option<StripFrame> {
        let newest = self.frames.back()?;
        if self.frames.len() == 1 {
            return Some(newest.clone());
        }

        let count = newest.len();
        let mut sums = vec![[0u64; 3]; count];
        let mut total_weight = 0u64;
        for (age, frame) in self.frames.iter().rev().enumerate() {
            let weight = (self.window - age) as u64;
            total_weight += weight;
            for (sum, led) in sums.iter_mut().zip(frame.leds()) {
                sum[0] += weight * u64::from(led.r);
                sum[1] += weight * u64::from(led.g);
                sum[2] += weight * u64::from(led.b);
            }
        }

        let mut out = StripFrame::new(*newest.layout());
        for (led, sum) in out.leds_mut().iter_mut().zip(&sums) {
            *led = Rgb8::new(
                (sum[0] / total_weight) as u8,
                (sum[1] / total_weight) as u8,
                (sum[2] / total_weight) as u8,
            );
        }
        Some(out)
    }
}
