//! Streaming engine for lumen LED strips.
//!
//! [`StripRunner`] drives one effect over one [`Connection`](lumen_transport::Connection):
//! a frame loop sampling the effect at its requested cadence and a keepalive
//! loop advertising stream liveness, both stopped by one cancellation token.
//!
//! [`StripSupervisor`] owns the active run and serializes replacements: a new
//! configuration only starts once the previous run has fully drained.

pub mod config;
pub mod error;
pub mod runner;
pub mod session;

pub use config::{
    CaptureSettings, ConnectionSettings, DisplaySource, EffectKind, EffectSettings,
    EffectSettingsCache, LumenSettings, StripSettings,
};
pub use error::{Result, RunnerError};
pub use runner::{RunReport, RunnerConfig, StripRunner};
pub use session::{AppliedEffect, Connector, StripSupervisor, UdpConnector};
