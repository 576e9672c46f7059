//! Persistent settings model.
//!
//! The record is owned by an external store (a JSON file for the CLI); the
//! runner reads it and writes back invalidated effect parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use lumen_effect::{
    ambient, AmbientConfig, AmbientEffect, CalibrationEffect, CaptureRegistry, CaptureService,
    Effect, OffEffect, SolidEffect, StillImageService, StillImageSource,
};
use lumen_strip::{Rgb8, StripLayout};
use serde::{Deserialize, Serialize};

/// Top-level settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenSettings {
    pub strip: StripSettings,
    pub capture: CaptureSettings,
}

/// Strip geometry, endpoint, and effect selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripSettings {
    pub layout: StripLayout,
    pub connection: ConnectionSettings,
    pub active_effect: Option<EffectKind>,
    pub effects: EffectSettingsCache,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            layout: StripLayout::new(20, 40, 20, 40),
            connection: ConnectionSettings::default(),
            active_effect: None,
            effects: EffectSettingsCache::default(),
        }
    }
}

impl StripSettings {
    /// Parameters of the active effect: cached, else defaults, else Off.
    pub fn current_effect_settings(&self) -> EffectSettings {
        match self.active_effect {
            Some(kind) => self
                .effects
                .get(kind)
                .cloned()
                .unwrap_or_else(|| EffectSettings::default_for(kind)),
            None => EffectSettings::Off,
        }
    }

    /// Forget the cached parameters of the active effect.
    pub fn delete_current_effect_settings(&mut self) -> Option<EffectSettings> {
        let kind = self.active_effect?;
        self.effects.remove(kind)
    }

    /// Make `settings` the active effect and cache its parameters.
    pub fn select_effect(&mut self, settings: EffectSettings) {
        self.active_effect = Some(settings.kind());
        self.effects.insert(settings);
    }
}

/// Controller endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub address: String,
    pub port: u16,
    /// Local UDP port. Same as `port` when unset; `0` binds an ephemeral
    /// port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            address: "192.168.0.50".to_string(),
            port: 34254,
            local_port: None,
        }
    }
}

impl ConnectionSettings {
    /// Port the local socket binds.
    pub fn local_bind_port(&self) -> u16 {
        self.local_port.unwrap_or(self.port)
    }
}

/// Effect selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Off,
    Solid,
    Calibration,
    Ambient,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Off,
        EffectKind::Solid,
        EffectKind::Calibration,
        EffectKind::Ambient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Off => "off",
            EffectKind::Solid => "solid",
            EffectKind::Calibration => "calibration",
            EffectKind::Ambient => "ambient",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown effect {s:?} (expected off, solid, calibration, ambient)"))
    }
}

/// Parameters of one effect kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSettings {
    Off,
    Solid {
        color: Rgb8,
    },
    Calibration,
    Ambient {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        monitor: Option<String>,
        fps: u32,
        detail_level: u32,
        smoothing_window: usize,
    },
}

impl EffectSettings {
    /// Default parameters of `kind`.
    pub fn default_for(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Off => EffectSettings::Off,
            EffectKind::Solid => EffectSettings::Solid { color: Rgb8::WHITE },
            EffectKind::Calibration => EffectSettings::Calibration,
            EffectKind::Ambient => {
                let defaults = AmbientConfig::default();
                EffectSettings::Ambient {
                    monitor: defaults.monitor,
                    fps: defaults.fps,
                    detail_level: defaults.detail_level,
                    smoothing_window: defaults.smoothing_window,
                }
            }
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectSettings::Off => EffectKind::Off,
            EffectSettings::Solid { .. } => EffectKind::Solid,
            EffectSettings::Calibration => EffectKind::Calibration,
            EffectSettings::Ambient { .. } => EffectKind::Ambient,
        }
    }

    /// Whether the effect can be built against `registry` right now.
    pub fn is_constructible(&self, registry: &CaptureRegistry) -> bool {
        match self {
            EffectSettings::Ambient { .. } => ambient::is_available(registry),
            _ => true,
        }
    }

    /// Build the effect for `layout`.
    pub fn build(
        &self,
        layout: StripLayout,
        registry: &CaptureRegistry,
    ) -> lumen_effect::Result<Box<dyn Effect>> {
        Ok(match self {
            EffectSettings::Off => Box::new(OffEffect::new(layout)),
            EffectSettings::Solid { color } => Box::new(SolidEffect::new(layout, *color)),
            EffectSettings::Calibration => Box::new(CalibrationEffect::new(layout)),
            EffectSettings::Ambient {
                monitor,
                fps,
                detail_level,
                smoothing_window,
            } => {
                let config = AmbientConfig {
                    monitor: monitor.clone(),
                    detail_level: *detail_level,
                    smoothing_window: *smoothing_window,
                    fps: *fps,
                };
                Box::new(AmbientEffect::try_build(layout, registry, &config)?)
            }
        })
    }
}

/// Cached effect parameters, at most one entry per kind.
///
/// Serialized as a list of tagged records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EffectSettings>", into = "Vec<EffectSettings>")]
pub struct EffectSettingsCache {
    entries: BTreeMap<EffectKind, EffectSettings>,
}

impl EffectSettingsCache {
    pub fn get(&self, kind: EffectKind) -> Option<&EffectSettings> {
        self.entries.get(&kind)
    }

    /// Store `settings`, replacing any entry of the same kind.
    pub fn insert(&mut self, settings: EffectSettings) -> Option<EffectSettings> {
        self.entries.insert(settings.kind(), settings)
    }

    pub fn remove(&mut self, kind: EffectKind) -> Option<EffectSettings> {
        self.entries.remove(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectSettings> {
        self.entries.values()
    }
}

impl From<Vec<EffectSettings>> for EffectSettingsCache {
    fn from(list: Vec<EffectSettings>) -> Self {
        let mut cache = Self::default();
        // Later records win.
        for settings in list {
            cache.insert(settings);
        }
        cache
    }
}

impl From<EffectSettingsCache> for Vec<EffectSettings> {
    fn from(cache: EffectSettingsCache) -> Self {
        cache.entries.into_values().collect()
    }
}

/// Capture backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Image files exposed as displays by the still-image backend.
    pub displays: Vec<DisplaySource>,
}

/// A named image file standing in for a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySource {
    pub name: String,
    pub path: PathBuf,
}

impl CaptureSettings {
    /// Registry creating a still-image backend over the configured sources.
    pub fn registry(&self) -> CaptureRegistry {
        let sources: Vec<StillImageSource> = self
            .displays
            .iter()
            .map(|display| StillImageSource {
                name: display.name.clone(),
                path: display.path.clone(),
            })
            .collect();
        CaptureRegistry::new(move || {
            Ok(Arc::new(StillImageService::new(sources.clone())) as Arc<dyn CaptureService>)
        })
    }
}
