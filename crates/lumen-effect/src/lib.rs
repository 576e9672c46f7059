//! Lighting effects for perimeter LED strips.
//!
//! An [`Effect`] produces a full [`StripFrame`](lumen_strip::StripFrame) on
//! request and declares how often it wants to be sampled. Resources an effect
//! holds are released when it is dropped.
//!
//! - [`OffEffect`], [`SolidEffect`], [`CalibrationEffect`]: static frames
//! - [`AmbientEffect`]: mirrors the edges of a captured display, smoothed
//!   over recent frames
//!
//! Screen capture goes through the [`capture`] traits. Backends are scarce
//! process-wide resources and are shared through a [`CaptureRegistry`].

pub mod ambient;
pub mod calibration;
pub mod capture;
pub mod effect;
pub mod error;
pub mod solid;

pub use ambient::{AmbientConfig, AmbientEffect};
pub use calibration::CalibrationEffect;
pub use capture::registry::CaptureRegistry;
pub use capture::still_image::{StillImageService, StillImageSource};
pub use capture::{CaptureImage, CaptureService, Display, GraphicsCard, ScreenCapture, ZoneId};
pub use effect::{Effect, MIN_INTERVAL, STATIC_INTERVAL};
pub use error::{EffectError, Result};
pub use solid::{OffEffect, SolidEffect};
