#![forbid(unsafe_code)]

//! Collaborators the menu engine calls into.
//!
//! The engine never paints, freezes or plays anything itself. A host wires
//! one value implementing all three traits and the blanket [`Host`] impl
//! picks it up.

use crate::player::PlayerId;

/// Paints a markup string onto a player's HUD.
pub trait DisplaySink: Send + Sync {
    fn set_text(&self, player: PlayerId, markup: &str);
    fn clear_text(&self, player: PlayerId);
}

/// Movement control and liveness queries.
pub trait PlayerControl: Send + Sync {
    fn set_movement_frozen(&self, player: PlayerId, frozen: bool);
    fn is_player_valid(&self, player: PlayerId) -> bool;
}

/// Fire-and-forget sound playback.
pub trait AudioFeedback: Send + Sync {
    fn play_sound(&self, player: PlayerId, sound: &str, volume: f32);
}

/// Everything the navigator needs from the host.
pub trait Host: DisplaySink + PlayerControl + AudioFeedback {}

impl<T: DisplaySink + PlayerControl + AudioFeedback> Host for T {}

/// Which configured sound accompanies an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Option activated.
    Use,
    /// Cursor moved.
    Scroll,
    /// Menu left.
    Exit,
}
