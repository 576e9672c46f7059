//! Screen capture backend seam.
//!
//! A [`CaptureService`] enumerates adapters and displays and opens a
//! [`ScreenCapture`] per display. Capture zones are registered at a
//! downscale level: the backend halves the zone resolution that many times
//! before exposing pixels.

use std::sync::Arc;

use lumen_strip::Rgb8;

use crate::error::Result;

pub mod registry;
pub mod still_image;

/// A graphics adapter known to the capture backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsCard {
    pub index: usize,
    pub name: String,
}

/// A display attached to a graphics adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Display {
    pub index: usize,
    pub device_name: String,
    pub width: u32,
    pub height: u32,
}

/// Handle of a registered capture zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId(pub u64);

/// Process-wide capture backend.
pub trait CaptureService: Send + Sync {
    /// Available graphics adapters.
    fn graphics_cards(&self) -> Vec<GraphicsCard>;

    /// Displays attached to `card`.
    fn displays(&self, card: &GraphicsCard) -> Vec<Display>;

    /// Open (or reuse) the capture of `display`.
    fn screen_capture(&self, display: &Display) -> Result<Arc<dyn ScreenCapture>>;
}

/// Capture of a single display.
pub trait ScreenCapture: Send + Sync {
    /// The captured display.
    fn display(&self) -> &Display;

    /// Register a region to capture at `downscale_level`.
    fn register_zone(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        downscale_level: u32,
    ) -> Result<ZoneId>;

    /// Remove a zone. Returns false when the zone was not registered.
    fn unregister_zone(&self, zone: ZoneId) -> bool;

    /// Grab the screen. Returns false when no new frame is available.
    fn capture_screen(&self) -> bool;

    /// Latest pixels of `zone`, if it has been captured.
    fn zone_image(&self, zone: ZoneId) -> Option<CaptureImage>;
}

/// Row-major captured pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb8>,
}

impl CaptureImage {
    /// Wrap row-major pixels. Returns `None` when the sizes disagree.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb8>) -> Option<Self> {
        (width * height == pixels.len()).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb8 {
        self.pixels[y * self.width + x]
    }

    /// Pixels of row `y`, left to right.
    pub fn row(&self, y: usize) -> &[Rgb8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Pixels of column `x`, top to bottom.
    pub fn column(&self, x: usize) -> Vec<Rgb8> {
        (0..self.height).map(|y| self.pixel(x, y)).collect()
    }

    pub fn top_row(&self) -> &[Rgb8] {
        if self.height == 0 {
            return &[];
        }
        self.row(0)
    }

    pub fn bottom_row(&self) -> &[Rgb8] {
        if self.height == 0 {
            return &[];
        }
        self.row(self.height - 1)
    }

    pub fn left_column(&self) -> Vec<Rgb8> {
        if self.width == 0 {
            return Vec::new();
        }
        self.column(0)
    }

    pub fn right_column(&self) -> Vec<Rgb8> {
        if self.width == 0 {
            return Vec::new();
        }
        self.column(self.width - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> CaptureImage {
        let pixels = (0..width * height)
            .map(|i| Rgb8::new(i as u8, 0, 0))
            .collect();
        CaptureImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn edges_of_3x2_image() {
        let image = numbered(3, 2);
        let reds = |px: &[Rgb8]| px.iter().map(|p| p.r).collect::<Vec<_>>();
        assert_eq!(reds(image.top_row()), vec![0, 1, 2]);
        assert_eq!(reds(image.bottom_row()), vec![3, 4, 5]);
        assert_eq!(reds(&image.left_column()), vec![0, 3]);
        assert_eq!(reds(&image.right_column()), vec![2, 5]);
    }

    #[test]
    fn empty_image_has_empty_edges() {
        let image = CaptureImage::new(0, 0, Vec::new()).unwrap();
        assert!(image.top_row().is_empty());
        assert!(image.right_column().is_empty());
    }

    #[test]
    fn rejects_mismatched_size() {
        assert!(CaptureImage::new(2, 2, vec![Rgb8::BLACK; 3]).is_none());
    }
}
