#![forbid(unsafe_code)]

//! Core types for hudmenu.
//!
//! This crate holds everything the menu engine shares with its host:
//! - [`PlayerId`] - opaque identity of a connected player
//! - [`KeyBind`] - bit set of bindable keys, plus [`KeyProfile`] resolution
//! - [`KeyEvent`] - a raw key transition delivered by the host
//! - [`Host`] - the display, player-control and audio collaborators
//! - [`TimerHandle`] - cancellable handle for scheduled callbacks
//! - [`MenuManagerConfiguration`] - host settings, from serde or the settings blob
//!
//! # Example
//! ```
//! use hudmenu_core::{KeyBind, KeyProfile, MenuAction, MenuKeybindOverrides};
//!
//! let profile = KeyProfile::resolve(
//!     &MenuKeybindOverrides::default(),
//!     &KeyProfile::button(KeyBind::S, KeyBind::W, KeyBind::E, KeyBind::A),
//! );
//! assert_eq!(profile.action_for(KeyBind::E), Some(MenuAction::Select));
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod keybind;
pub mod player;
pub mod timer;

pub use config::{InputMode, MenuManagerConfiguration, SoundSettings};
pub use error::{ConfigError, MenuError};
pub use event::KeyEvent;
pub use host::{AudioFeedback, DisplaySink, Host, PlayerControl, SoundCue};
pub use keybind::{KeyBind, KeyProfile, MenuAction, MenuKeybindOverrides};
pub use player::PlayerId;
pub use timer::TimerHandle;
