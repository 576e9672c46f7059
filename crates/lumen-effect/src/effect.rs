use std::time::Duration;

use lumen_strip::StripFrame;

/// Sampling interval of effects whose output never changes.
pub const STATIC_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest interval an effect may request. Stands in for "as fast as possible".
pub const MIN_INTERVAL: Duration = Duration::from_nanos(1);

/// A frame source with a self-declared sampling cadence.
pub trait Effect: Send {
    /// Short effect name for diagnostics.
    fn name(&self) -> &'static str;

    /// How often the effect wants to be sampled.
    fn requested_interval(&self) -> Duration;

    /// Produce the next frame, or `None` when no new frame is available.
    ///
    /// `None` is not an error; the caller skips this tick.
    fn next_frame(&mut self) -> Option<StripFrame>;
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn requested_interval(&self) -> Duration {
        (**self).requested_interval()
    }

    fn next_frame(&mut self) -> Option<StripFrame> {
        (**self).next_frame()
    }
}
