//! Message kind discriminators.
//!
//! The discriminator is the 16-bit tag following the timestamp. The set is
//! closed; decoding rejects anything else.

/// Placeholder kind with no payload. Decoded, never sent by the host.
pub const EMPTY: u16 = 0;

/// Liveness message carrying a validity duration.
pub const KEEP_ALIVE: u16 = 1;

/// Full strip color state.
pub const LED_STATE: u16 = 2;

/// Returns a human-readable name for a discriminator.
pub fn discriminator_name(id: u16) -> &'static str {
    match id {
        EMPTY => "EMPTY",
        KEEP_ALIVE => "KEEP_ALIVE",
        LED_STATE => "LED_STATE",
        _ => "UNKNOWN",
    }
}

/// Returns true if the discriminator names a known message kind.
pub fn is_known(id: u16) -> bool {
    id <= LED_STATE
}
