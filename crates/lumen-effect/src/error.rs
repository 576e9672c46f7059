/// Errors that can occur while building or running an effect.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    /// The capture backend exposes no graphics adapter.
    #[error("no graphics adapter available for screen capture")]
    NoGraphicsCard,

    /// No display with the requested name exists on the selected adapter.
    #[error("display {monitor:?} not found")]
    DisplayNotFound { monitor: String },

    /// The capture backend rejected a request.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// An image source could not be read or decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, EffectError>;
