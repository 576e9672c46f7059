//! Perimeter LED strip geometry and pixel frames.
//!
//! A strip runs around a display in four linear segments. Pixels are stored
//! in one flat buffer in fixed order: right, top, left, bottom.
//!
//! This is the lowest layer of lumen. Effects produce [`StripFrame`]s, the
//! protocol crate serializes their [`Rgb8`] pixels.

pub mod frame;
pub mod layout;
pub mod rgb;

pub use frame::StripFrame;
pub use layout::{Side, StripLayout};
pub use rgb::Rgb8;
