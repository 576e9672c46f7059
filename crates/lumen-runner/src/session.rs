use std::sync::Arc;

use async_trait::async_trait;
use lumen_effect::{ambient, CaptureRegistry, Effect, OffEffect};
use lumen_transport::{Connection, UdpConnection};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{ConnectionSettings, EffectKind, StripSettings};
use crate::error::{Result, RunnerError};
use crate::runner::{RunReport, RunnerConfig, StripRunner};

/// Opens connections to the controller.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>>;
}

/// Connects over UDP.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

#[async_trait]
impl Connector for UdpConnector {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>> {
        let connection = UdpConnection::connect(
            &settings.address,
            settings.port,
            Some(settings.local_bind_port()),
        )
        .await?;
        Ok(Arc::new(connection))
    }
}

/// Outcome of [`StripSupervisor::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEffect {
    /// The effect kind now running.
    pub running: EffectKind,
    /// True when the requested effect failed to build and Off runs instead.
    pub fell_back: bool,
}

struct ActiveRun {
    cancel: CancellationToken,
    handle: JoinHandle<RunReport>,
}

/// Owns the single active run.
///
/// Every [`apply`](Self::apply) cancels and fully drains the previous run
/// before opening a new connection, so two runs never share the transport.
pub struct StripSupervisor {
    registry: CaptureRegistry,
    connector: Arc<dyn Connector>,
    runner_config: RunnerConfig,
    active: Option<ActiveRun>,
}

impl StripSupervisor {
    pub fn new(registry: CaptureRegistry, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
            runner_config: RunnerConfig::default(),
            active: None,
        }
    }

    pub fn with_runner_config(mut self, config: RunnerConfig) -> Self {
        self.runner_config = config;
        self
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the active run with one built from `settings`.
    ///
    /// When the requested effect cannot be built its cached parameters are
    /// deleted from `settings` and Off runs instead.
    pub async fn apply(&mut self, settings: &mut StripSettings) -> Result<AppliedEffect> {
        self.stop().await?;

        let connection = self.connector.connect(&settings.connection).await?;
        let layout = settings.layout;
        let requested = settings.current_effect_settings();

        let built = if requested.is_constructible(&self.registry) {
            requested.build(layout, &self.registry).map_err(|err| err.to_string())
        } else {
            Err("capture backend unavailable".to_string())
        };

        let (effect, applied) = match built {
            Ok(effect) => (
                effect,
                AppliedEffect {
                    running: requested.kind(),
                    fell_back: false,
                },
            ),
            Err(reason) => {
                error!(effect = %requested.kind(), error = %reason, "effect construction failed");
                if requested.kind() == EffectKind::Ambient {
                    let available = ambient::monitor_names(&self.registry).unwrap_or_default();
                    warn!(?available, "falling back to off");
                } else {
                    warn!("falling back to off");
                }
                settings.delete_current_effect_settings();
                let fallback: Box<dyn Effect> = Box::new(OffEffect::new(layout));
                (
                    fallback,
                    AppliedEffect {
                        running: EffectKind::Off,
                        fell_back: true,
                    },
                )
            }
        };

        let cancel = CancellationToken::new();
        let runner = StripRunner::with_config(connection, self.runner_config.clone());
        let handle = tokio::spawn(run_to_completion(runner, effect, cancel.clone()));
        self.active = Some(ActiveRun { cancel, handle });
        Ok(applied)
    }

    /// Cancel the active run and wait until it has released its resources.
    pub async fn stop(&mut self) -> Result<Option<RunReport>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        active.cancel.cancel();
        let report = active
            .handle
            .await
            .map_err(|err| RunnerError::Join(err.to_string()))?;
        Ok(Some(report))
    }

    /// Cancellation token of the active run.
    pub fn cancellation(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|active| active.cancel.clone())
    }
}

/// Dropping a supervisor cancels and aborts its run without waiting for it.
/// Use [`stop`](StripSupervisor::stop) to drain the run first.
impl Drop for StripSupervisor {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.handle.abort();
        }
    }
}

impl std::fmt::Debug for StripSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripSupervisor")
            .field("registry", &self.registry)
            .field("runner_config", &self.runner_config)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run_to_completion(
    runner: StripRunner,
    effect: Box<dyn Effect>,
    cancel: CancellationToken,
) -> RunReport {
    let report = runner.run_with_effect(effect, &cancel).await;
    drop(runner);
    info!("run resources released");
    report
}
