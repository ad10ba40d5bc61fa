#![forbid(unsafe_code)]

//! Player identity.

use std::fmt;

/// Opaque identifier for a connected player, as handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Raw slot value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PlayerId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_slot() {
        assert_eq!(PlayerId(7).to_string(), "player#7");
    }

    #[test]
    fn from_u32_round_trips() {
        assert_eq!(PlayerId::from(3).get(), 3);
    }
}
