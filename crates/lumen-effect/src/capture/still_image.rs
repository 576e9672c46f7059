use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use image::imageops::{self, FilterType};
use image::RgbImage;
use lumen_strip::Rgb8;
use tracing::{debug, warn};

use crate::capture::{CaptureImage, CaptureService, Display, GraphicsCard, ScreenCapture, ZoneId};
use crate::error::{EffectError, Result};

/// Adapter name reported by [`StillImageService`].
pub const STILL_IMAGE_ADAPTER: &str = "still-image";

/// An image file exposed as a display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImageSource {
    pub name: String,
    pub path: PathBuf,
}

/// Capture backend reading displays from image files.
///
/// Every capture re-reads the file, so an external tool that keeps
/// overwriting it drives the ambient effect like a live screen.
#[derive(Debug)]
pub struct StillImageService {
    card: GraphicsCard,
    sources: Vec<StillImageSource>,
}

impl StillImageService {
    pub fn new(sources: Vec<StillImageSource>) -> Self {
        Self {
            card: GraphicsCard {
                index: 0,
                name: STILL_IMAGE_ADAPTER.to_string(),
            },
            sources,
        }
    }

    fn source(&self, name: &str) -> Option<&StillImageSource> {
        self.sources.iter().find(|source| source.name == name)
    }
}

impl CaptureService for StillImageService {
    fn graphics_cards(&self) -> Vec<GraphicsCard> {
        vec![self.card.clone()]
    }

    fn displays(&self, card: &GraphicsCard) -> Vec<Display> {
        if *card != self.card {
            return Vec::new();
        }
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(index, source)| match image::image_dimensions(&source.path) {
                Ok((width, height)) => Some(Display {
                    index,
                    device_name: source.name.clone(),
                    width,
                    height,
                }),
                Err(err) => {
                    warn!(path = ?source.path, error = %err, "skipping unreadable image source");
                    None
                }
            })
            .collect()
    }

    fn screen_capture(&self, display: &Display) -> Result<Arc<dyn ScreenCapture>> {
        let source = self
            .source(&display.device_name)
            .ok_or_else(|| EffectError::DisplayNotFound {
                monitor: display.device_name.clone(),
            })?;
        Ok(Arc::new(StillImageCapture {
            display: display.clone(),
            path: source.path.clone(),
            zones: Mutex::new(ZoneTable::default()),
        }))
    }
}

#[derive(Default)]
struct ZoneTable {
    next_id: u64,
    zones: HashMap<ZoneId, Zone>,
}

struct Zone {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    downscale_level: u32,
    image: Option<CaptureImage>,
}

struct StillImageCapture {
    display: Display,
    path: PathBuf,
    zones: Mutex<ZoneTable>,
}

impl StillImageCapture {
    fn table(&self) -> std::sync::MutexGuard<'_, ZoneTable> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScreenCapture for StillImageCapture {
    fn display(&self) -> &Display {
        &self.display
    }

    fn register_zone(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        downscale_level: u32,
    ) -> Result<ZoneId> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.display.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.display.height);
        if !fits_x || !fits_y {
            return Err(EffectError::Capture(format!(
                "zone {width}x{height}+{x}+{y} exceeds display {}x{}",
                self.display.width, self.display.height
            )));
        }

        let mut table = self.table();
        let id = ZoneId(table.next_id);
        table.next_id += 1;
        table.zones.insert(
            id,
            Zone {
                x,
                y,
                width,
                height,
                downscale_level,
                image: None,
            },
        );
        debug!(zone = id.0, width, height, downscale_level, "registered capture zone");
        Ok(id)
    }

    fn unregister_zone(&self, zone: ZoneId) -> bool {
        self.table().zones.remove(&zone).is_some()
    }

    fn capture_screen(&self) -> bool {
        let frame = match image::open(&self.path) {
            Ok(decoded) => decoded.to_rgb8(),
            Err(err) => {
                debug!(path = ?self.path, error = %err, "no frame from image source");
                return false;
            }
        };

        let mut table = self.table();
        for zone in table.zones.values_mut() {
            zone.image = sample_zone(&frame, zone);
        }
        true
    }

    fn zone_image(&self, zone: ZoneId) -> Option<CaptureImage> {
        self.table().zones.get(&zone)?.image.clone()
    }
}

/// Crop `zone` out of `frame` and halve it `downscale_level` times.
fn sample_zone(frame: &RgbImage, zone: &Zone) -> Option<CaptureImage> {
    let x = zone.x.min(frame.width());
    let y = zone.y.min(frame.height());
    let width = zone.width.min(frame.width() - x);
    let height = zone.height.min(frame.height() - y);

    let cropped = imageops::crop_imm(frame, x, y, width, height).to_image();
    let target_width = downscaled(width, zone.downscale_level);
    let target_height = downscaled(height, zone.downscale_level);
    let scaled = if (target_width, target_height) == (width, height) || width == 0 || height == 0 {
        cropped
    } else {
        imageops::resize(&cropped, target_width, target_height, FilterType::Triangle)
    };

    let pixels = scaled.pixels().map(|p| Rgb8::from(p.0)).collect();
    CaptureImage::new(scaled.width() as usize, scaled.height() as usize, pixels)
}

/// `n` halved `level` times, never below one pixel.
pub(crate) fn downscaled(n: u32, level: u32) -> u32 {
    n.checked_shr(level).unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(tag: &str, width: u32, height: u32) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lumen-still-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join("screen.png");
        let image = RgbImage::from_fn(width, height, |x, y| {
            if x == 0 {
                image::Rgb([255, 0, 0])
            } else if y == 0 {
                image::Rgb([0, 0, 255])
            } else {
                image::Rgb([10, 20, 30])
            }
        });
        image.save(&path).expect("png should be writable");
        path
    }

    fn service_for(path: PathBuf) -> StillImageService {
        StillImageService::new(vec![StillImageSource {
            name: "DISPLAY1".to_string(),
            path,
        }])
    }

    #[test]
    fn test_display_reports_image_size() {
        let path = write_test_image("size", 64, 32);
        let service = service_for(path.clone());
        let cards = service.graphics_cards();
        assert_eq!(cards[0].name, STILL_IMAGE_ADAPTER);

        let displays = service.displays(&cards[0]);
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].device_name, "DISPLAY1");
        assert_eq!((displays[0].width, displays[0].height), (64, 32));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let service = service_for(PathBuf::from("/nonexistent/lumen/screen.png"));
        let card = service.graphics_cards().remove(0);
        assert!(service.displays(&card).is_empty());
    }

    #[test]
    fn test_zone_is_downscaled_by_level() {
        let path = write_test_image("zone", 64, 32);
        let service = service_for(path.clone());
        let card = service.graphics_cards().remove(0);
        let display = service.displays(&card).remove(0);
        let capture = service.screen_capture(&display).unwrap();

        let zone = capture.register_zone(0, 0, 64, 32, 2).unwrap();
        assert!(capture.zone_image(zone).is_none(), "nothing captured yet");
        assert!(capture.capture_screen());

        let image = capture.zone_image(zone).unwrap();
        assert_eq!((image.width(), image.height()), (16, 8));
        assert!(capture.unregister_zone(zone));
        assert!(!capture.unregister_zone(zone));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_level_zero_keeps_pixels_exact() {
        let path = write_test_image("exact", 8, 4);
        let service = service_for(path.clone());
        let card = service.graphics_cards().remove(0);
        let display = service.displays(&card).remove(0);
        let capture = service.screen_capture(&display).unwrap();

        let zone = capture.register_zone(0, 0, 8, 4, 0).unwrap();
        assert!(capture.capture_screen());
        let image = capture.zone_image(zone).unwrap();
        assert_eq!(image.pixel(0, 2), Rgb8::RED);
        assert_eq!(image.pixel(5, 0), Rgb8::BLUE);
        assert_eq!(image.pixel(5, 3), Rgb8::new(10, 20, 30));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_capture_fails_soft_when_file_disappears() {
        let path = write_test_image("gone", 4, 4);
        let service = service_for(path.clone());
        let card = service.graphics_cards().remove(0);
        let display = service.displays(&card).remove(0);
        let capture = service.screen_capture(&display).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(!capture.capture_screen());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_zone_outside_display_rejected() {
        let path = write_test_image("bounds", 4, 4);
        let service = service_for(path.clone());
        let card = service.graphics_cards().remove(0);
        let display = service.displays(&card).remove(0);
        let capture = service.screen_capture(&display).unwrap();
        assert!(capture.register_zone(2, 0, 4, 4, 0).is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_downscaled_never_reaches_zero() {
        assert_eq!(downscaled(1920, 3), 240);
        assert_eq!(downscaled(3, 5), 1);
        assert_eq!(downscaled(3, 40), 1);
    }
}
