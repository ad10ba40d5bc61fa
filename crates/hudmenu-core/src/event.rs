#![forbid(unsafe_code)]

//! Input events delivered by the host.

use crate::keybind::KeyBind;
use crate::player::PlayerId;

/// A single key transition for one player.
///
/// Only the rising edge (`pressed == true`) is actionable; releases are
/// delivered for completeness and ignored by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Player who produced the event.
    pub player: PlayerId,
    /// Key that changed state.
    pub key: KeyBind,
    /// `true` on press, `false` on release.
    pub pressed: bool,
}

impl KeyEvent {
    /// A key press.
    #[must_use]
    pub const fn press(player: PlayerId, key: KeyBind) -> Self {
        Self {
            player,
            key,
            pressed: true,
        }
    }

    /// A key release.
    #[must_use]
    pub const fn release(player: PlayerId, key: KeyBind) -> Self {
        Self {
            player,
            key,
            pressed: false,
        }
    }

    /// Whether this event should drive a menu action.
    #[inline]
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.pressed
    }
}
