//! Screen-mirroring effect.
//!
//! Each sample triggers one capture, maps the captured image's outer edges
//! onto the strip sides, and blends the result with recent frames.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use lumen_strip::{StripFrame, StripLayout};
use tracing::{debug, error};

use crate::capture::registry::CaptureRegistry;
use crate::capture::{CaptureService, Display, GraphicsCard, ScreenCapture, ZoneId};
use crate::effect::{Effect, MIN_INTERVAL};
use crate::error::{EffectError, Result};

mod sampling;
mod smoothing;

pub use sampling::{compress_index, compress_into, edges_to_frame};
pub use smoothing::FrameHistory;

/// Parameters of an [`AmbientEffect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientConfig {
    /// Display device name. `None` selects the first display.
    pub monitor: Option<String>,
    /// Halvings applied by the backend before exposing pixels.
    pub detail_level: u32,
    /// Number of recent frames blended together.
    pub smoothing_window: usize,
    /// Samples per second. 0 samples as fast as possible.
    pub fps: u32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            monitor: None,
            detail_level: 6,
            smoothing_window: 4,
            fps: 60,
        }
    }
}

/// Mirrors the edges of a captured display onto the strip.
pub struct AmbientEffect {
    layout: StripLayout,
    fps: u32,
    capture: Arc<dyn ScreenCapture>,
    zone: ZoneId,
    history: FrameHistory,
    // Keeps the shared backend alive for as long as the effect runs.
    _service: Arc<dyn CaptureService>,
}

impl AmbientEffect {
    /// Open a full-display capture zone on the first adapter.
    ///
    /// Fails when the backend has no adapter or no display matches
    /// `config.monitor`.
    pub fn try_build(
        layout: StripLayout,
        registry: &CaptureRegistry,
        config: &AmbientConfig,
    ) -> Result<Self> {
        let service = registry.acquire()?;
        let card = first_card(service.as_ref())?;
        let target = find_display(service.as_ref(), &card, config.monitor.as_deref())?;

        let capture = service.screen_capture(&target)?;
        let zone = capture.register_zone(0, 0, target.width, target.height, config.detail_level)?;
        debug!(
            adapter = %card.name,
            display = %target.device_name,
            detail_level = config.detail_level,
            smoothing_window = config.smoothing_window,
            fps = config.fps,
            "ambient effect ready"
        );

        Ok(Self {
            layout,
            fps: config.fps,
            capture,
            zone,
            history: FrameHistory::new(config.smoothing_window),
            _service: service,
        })
    }
}

impl Effect for AmbientEffect {
    fn name(&self) -> &'static str {
        "ambient"
    }

    fn requested_interval(&self) -> Duration {
        interval_for_fps(self.fps)
    }

    fn next_frame(&mut self) -> Option<StripFrame> {
        if !self.capture.capture_screen() {
            return None;
        }
        let image = self.capture.zone_image(self.zone)?;
        self.history.push(edges_to_frame(self.layout, &image));
        self.history.weighted_average()
    }
}

impl Drop for AmbientEffect {
    fn drop(&mut self) {
        if !self.capture.unregister_zone(self.zone) {
            error!(zone = self.zone.0, "failed to unregister capture zone");
        }
    }
}

impl std::fmt::Debug for AmbientEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientEffect")
            .field("layout", &self.layout)
            .field("fps", &self.fps)
            .field("display", &self.capture.display().device_name)
            .field("zone", &self.zone)
            .field("history", &self.history.len())
            .finish()
    }
}

/// Sampling interval for `fps`. 0 maps to [`MIN_INTERVAL`].
pub fn interval_for_fps(fps: u32) -> Duration {
    if fps == 0 {
        return MIN_INTERVAL;
    }
    Duration::from_secs(1) / fps
}

fn first_card(service: &dyn CaptureService) -> Result<GraphicsCard> {
    service.graphics_cards().into_iter().next().ok_or_else(|| {
        error!("no graphics adapter available");
        EffectError::NoGraphicsCard
    })
}

fn find_display(
    service: &dyn CaptureService,
    card: &GraphicsCard,
    monitor: Option<&str>,
) -> Result<Display> {
    let displays = service.displays(card);
    let found = match monitor {
        Some(name) => displays.into_iter().find(|d| d.device_name == name),
        None => displays.into_iter().next(),
    };
    found.ok_or_else(|| {
        let monitor = monitor.unwrap_or("<first>").to_string();
        error!(adapter = %card.name, %monitor, "display not found");
        EffectError::DisplayNotFound { monitor }
    })
}

/// Every display on every adapter, paired with its adapter name.
pub fn monitors(registry: &CaptureRegistry) -> Result<Vec<(String, Display)>> {
    let service = registry.acquire()?;
    Ok(service
        .graphics_cards()
        .into_iter()
        .flat_map(|card| {
            let displays = service.displays(&card);
            displays.into_iter().map(move |display| (card.name.clone(), display))
        })
        .collect())
}

/// Device names of every display on every adapter.
pub fn monitor_names(registry: &CaptureRegistry) -> Result<Vec<String>> {
    Ok(monitors(registry)?
        .into_iter()
        .map(|(_, display)| display.device_name)
        .collect())
}

pub fn graphics_card_names(registry: &CaptureRegistry) -> Result<Vec<String>> {
    let service = registry.acquire()?;
    Ok(service
        .graphics_cards()
        .into_iter()
        .map(|card| card.name)
        .collect())
}

/// Valid detail levels for `monitor` on the first adapter.
pub fn detail_level_range(registry: &CaptureRegistry, monitor: Option<&str>) -> Result<Range<u32>> {
    let service = registry.acquire()?;
    let card = first_card(service.as_ref())?;
    let display = find_display(service.as_ref(), &card, monitor)?;
    Ok(0..detail_levels(display.width, display.height))
}

/// Number of halvings before either dimension drops below 1.
pub fn detail_levels(mut width: u32, mut height: u32) -> u32 {
    let mut levels = 0;
    while width >= 1 && height >= 1 {
        width /= 2;
        height /= 2;
        levels += 1;
    }
    levels
}

/// True when the backend exposes at least one adapter.
pub fn is_available(registry: &CaptureRegistry) -> bool {
    registry
        .acquire()
        .map(|service| !service.graphics_cards().is_empty())
        .unwrap_or(false)
}
