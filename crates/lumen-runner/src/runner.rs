use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use lumen_effect::{Effect, MIN_INTERVAL};
use lumen_protocol::{ControllerMessage, MessageEncoder};
use lumen_transport::Connection;
use tokio::task::{self, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Longest tick period a loop will wait.
pub const MAX_INTERVAL: Duration = Duration::from_millis(i32::MAX as u64);

/// Runner timing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Period of the keepalive loop.
    pub keepalive_period: Duration,
    /// Liveness window advertised in each keepalive.
    pub keepalive_validity: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            keepalive_period: Duration::from_millis(400),
            keepalive_validity: Duration::from_millis(1000),
        }
    }
}

/// Counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// LED states handed to the connection.
    pub frames_sent: u64,
    /// Ticks where the effect had no new frame.
    pub frames_skipped: u64,
    /// Frames that could not be encoded.
    pub frames_dropped: u64,
    pub keepalives_sent: u64,
}

/// Streams one effect over one connection.
pub struct StripRunner {
    connection: Arc<dyn Connection>,
    config: RunnerConfig,
}

impl StripRunner {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self::with_config(connection, RunnerConfig::default())
    }

    pub fn with_config(connection: Arc<dyn Connection>, config: RunnerConfig) -> Self {
        Self { connection, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the frame and keepalive loops until `cancel` fires.
    ///
    /// Each loop runs as its own task and `next_frame` runs on the blocking
    /// pool, so a slow capture cannot delay keepalives. Returns once both
    /// loops have exited and their in-flight sends have been aborted; the
    /// effect is dropped before this returns.
    pub async fn run_with_effect(
        &self,
        effect: Box<dyn Effect>,
        cancel: &CancellationToken,
    ) -> RunReport {
        info!(
            effect = effect.name(),
            transport = self.connection.transport_name(),
            "run started"
        );

        let mut loops = JoinSet::new();
        loops.spawn(frame_loop(
            Arc::clone(&self.connection),
            effect,
            cancel.clone(),
        ));
        loops.spawn(keepalive_loop(
            Arc::clone(&self.connection),
            self.config.clone(),
            cancel.clone(),
        ));

        let mut report = RunReport::default();
        while let Some(joined) = loops.join_next().await {
            match joined {
                Ok(part) => report.merge(part),
                Err(err) => error!(error = %err, "streaming loop failed"),
            }
        }

        info!(
            frames_sent = report.frames_sent,
            frames_skipped = report.frames_skipped,
            frames_dropped = report.frames_dropped,
            keepalives_sent = report.keepalives_sent,
            "run stopped"
        );
        report
    }
}

impl RunReport {
    fn merge(&mut self, other: RunReport) {
        self.frames_sent += other.frames_sent;
        self.frames_skipped += other.frames_skipped;
        self.frames_dropped += other.frames_dropped;
        self.keepalives_sent += other.keepalives_sent;
    }
}

async fn frame_loop(
    connection: Arc<dyn Connection>,
    mut effect: Box<dyn Effect>,
    cancel: CancellationToken,
) -> RunReport {
    let period = clamp_interval(effect.requested_interval());
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut encoder = MessageEncoder::new();
    let mut sends = JoinSet::new();
    let mut report = RunReport::default();

    debug!(?period, "frame loop started");
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        reap(&mut sends);

        let captured = task::spawn_blocking(move || {
            let frame = effect.next_frame();
            (effect, frame)
        })
        .await;
        let frame = match captured {
            Ok((returned, frame)) => {
                effect = returned;
                frame
            }
            Err(err) => {
                error!(error = %err, "effect failed to produce a frame");
                break;
            }
        };

        let Some(frame) = frame else {
            report.frames_skipped += 1;
            continue;
        };
        let message = ControllerMessage::led_state(frame.into_leds());
        match encoder.encode(&message) {
            Ok(bytes) => {
                dispatch(&mut sends, &connection, Bytes::copy_from_slice(bytes));
                report.frames_sent += 1;
            }
            Err(err) => {
                warn!(error = %err, "dropping frame");
                report.frames_dropped += 1;
            }
        }
    }

    sends.shutdown().await;
    report
}

async fn keepalive_loop(
    connection: Arc<dyn Connection>,
    config: RunnerConfig,
    cancel: CancellationToken,
) -> RunReport {
    let period = clamp_interval(config.keepalive_period);
    let validity_ms = u32::try_from(config.keepalive_validity.as_millis()).unwrap_or(u32::MAX);
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut encoder = MessageEncoder::new();
    let mut sends = JoinSet::new();
    let mut report = RunReport::default();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        reap(&mut sends);

        match encoder.encode(&ControllerMessage::keep_alive(validity_ms)) {
            Ok(bytes) => {
                dispatch(&mut sends, &connection, Bytes::copy_from_slice(bytes));
                report.keepalives_sent += 1;
            }
            Err(err) => warn!(error = %err, "dropping keepalive"),
        }
    }

    sends.shutdown().await;
    report
}

impl std::fmt::Debug for StripRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripRunner")
            .field("transport", &self.connection.transport_name())
            .field("config", &self.config)
            .finish()
    }
}

/// Bound a requested period to `[MIN_INTERVAL, MAX_INTERVAL]`.
pub fn clamp_interval(requested: Duration) -> Duration {
    requested.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

fn dispatch(sends: &mut JoinSet<()>, connection: &Arc<dyn Connection>, datagram: Bytes) {
    let connection = Arc::clone(connection);
    sends.spawn(async move {
        if let Err(err) = connection.send(datagram).await {
            debug!(error = %err, transport = connection.transport_name(), "send failed");
        }
    });
}

fn reap(sends: &mut JoinSet<()>) {
    while sends.try_join_next().is_some() {}
}
