#![forbid(unsafe_code)]

//! Menus, options and per-player menu state for hudmenu.
//!
//! - [`paginate`] picks the visible window under a [`ScrollPolicy`]
//! - [`MenuOption`] is one row: text, button, toggle, slider, choice,
//!   submenu, async button, separator or progress bar
//! - [`Menu`] holds options plus a [`PlayerMenuState`] per viewer and
//!   renders HUD markup for each of them
//! - [`MenuBuilder`] validates key bindings and options up front
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use hudmenu_core::{MenuManagerConfiguration, PlayerId};
//! use hudmenu_widgets::{MenuBuilder, MenuOption};
//!
//! let menu = MenuBuilder::new("Settings")
//!     .option(MenuOption::toggle("Music", true))
//!     .build(Arc::new(MenuManagerConfiguration::default()))
//!     .unwrap();
//! let player = PlayerId(1);
//! menu.show_for(player, None);
//! let markup = menu.render_for(player, false).unwrap();
//! assert!(markup.contains("Music"));
//! ```

pub mod builder;
pub mod menu;
pub mod option;
pub mod option_set;
pub mod pagination;
pub mod player_state;
pub mod render;

pub use builder::MenuBuilder;
pub use menu::{HoverHook, Menu, MenuConfiguration, MenuHook, MenuId};
pub use option::{
    Activation, AsyncButtonState, AsyncJob, ChoiceState, MenuOption, OptionId, OptionKind,
    OptionRenderContext, OptionText, ProgressBarState, SliderState, SubmenuTarget, TextAlign,
    TextSize, ToggleState,
};
pub use option_set::MenuOptionSet;
pub use pagination::{PageWindow, ScrollPolicy, paginate, remap_desired};
pub use player_state::PlayerMenuState;
