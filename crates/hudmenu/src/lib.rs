#![forbid(unsafe_code)]

//! hudmenu public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and
//! offers a prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use hudmenu_core::{
    AudioFeedback, ConfigError, DisplaySink, Host, InputMode, KeyBind, KeyEvent, KeyProfile,
    MenuAction, MenuError, MenuKeybindOverrides, MenuManagerConfiguration, PlayerControl,
    PlayerId, SoundCue, SoundSettings, TimerHandle,
};

// --- Text re-exports -------------------------------------------------------

pub use hudmenu_text::{HorizontalStyle, OverflowStyle, ScrollDirection, TextEffectEngine};

// --- Widget re-exports -----------------------------------------------------

pub use hudmenu_widgets::{
    Menu, MenuBuilder, MenuConfiguration, MenuId, MenuOption, OptionId, OptionKind, ScrollPolicy,
    TextAlign, TextSize,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use hudmenu_runtime::{ManualScheduler, MenuNavigator, Scheduler, ThreadScheduler};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for hudmenu hosts.
#[derive(Debug)]
pub enum Error {
    /// A menu could not be built or linked.
    Menu(MenuError),
    /// The host settings could not be read.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Menu(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<MenuError> for Error {
    fn from(err: MenuError) -> Self {
        Self::Menu(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for hudmenu APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Host, HorizontalStyle, InputMode, KeyBind, KeyEvent, Menu, MenuBuilder,
        MenuManagerConfiguration, MenuOption, OverflowStyle, PlayerId, Result, ScrollPolicy,
        TextSize,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{MenuNavigator, ThreadScheduler};

    pub use crate::{core, text, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use hudmenu_core as core;
#[cfg(feature = "runtime")]
pub use hudmenu_runtime as runtime;
pub use hudmenu_text as text;
pub use hudmenu_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_and_display() {
        let err: Error = MenuError::SelfParent {
            menu: "Main".into(),
        }
        .into();
        assert!(matches!(err, Error::Menu(_)));
        assert!(std::error::Error::source(&err).is_some());

        let err: Error = ConfigError::UnknownInputMode("gamepad".into()).into();
        assert!(err.to_string().contains("gamepad"));
    }
}
