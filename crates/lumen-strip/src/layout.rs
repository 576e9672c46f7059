use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One of the four linear strip segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Right,
    Top,
    Left,
    Bottom,
}

impl Side {
    /// All sides in buffer order.
    pub const ALL: [Side; 4] = [Side::Right, Side::Top, Side::Left, Side::Bottom];

    /// Lowercase side name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Top => "top",
            Side::Left => "left",
            Side::Bottom => "bottom",
        }
    }
}

/// Geometry of a strip mounted around a display perimeter.
///
/// The flat pixel buffer is split into four contiguous ranges, always in the
/// order right, top, left, bottom. Zero-length sides yield empty ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StripLayout {
    right: usize,
    top: usize,
    left: usize,
    bottom: usize,
}

impl StripLayout {
    /// Create a layout from per-side LED counts.
    pub const fn new(right: usize, top: usize, left: usize, bottom: usize) -> Self {
        Self {
            right,
            top,
            left,
            bottom,
        }
    }

    /// Total number of LEDs.
    pub const fn count(&self) -> usize {
        self.right + self.top + self.left + self.bottom
    }

    /// Number of LEDs on the given side.
    pub const fn len(&self, side: Side) -> usize {
        match side {
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Left => self.left,
            Side::Bottom => self.bottom,
        }
    }

    /// True when the strip has no LEDs at all.
    pub const fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Longer of the two vertical sides.
    pub fn width(&self) -> usize {
        self.right.max(self.left)
    }

    /// Longer of the two horizontal sides.
    pub fn height(&self) -> usize {
        self.top.max(self.bottom)
    }

    /// Index range of `side` within the flat buffer.
    pub fn range(&self, side: Side) -> Range<usize> {
        let start = match side {
            Side::Right => 0,
            Side::Top => self.right,
            Side::Left => self.right + self.top,
            Side::Bottom => self.right + self.top + self.left,
        };
        start..start + self.len(side)
    }

    /// All four ranges in buffer order.
    pub fn ranges(&self) -> [Range<usize>; 4] {
        Side::ALL.map(|side| self.range(side))
    }
}
