/// Errors that can occur while starting or supervising a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The connection could not be opened.
    #[error("transport error: {0}")]
    Transport(#[from] lumen_transport::TransportError),

    /// The effect could not be built.
    #[error("effect error: {0}")]
    Effect(#[from] lumen_effect::EffectError),

    /// The run task panicked or was aborted.
    #[error("run task failed: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
