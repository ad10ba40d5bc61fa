#![forbid(unsafe_code)]

//! Fluent construction of [`Menu`]s.

use std::sync::Arc;
use std::time::Duration;

use hudmenu_core::{
    InputMode, KeyProfile, MenuError, MenuKeybindOverrides, MenuManagerConfiguration, PlayerId,
};
use hudmenu_text::HorizontalStyle;

use crate::menu::{Menu, MenuConfiguration, MenuHooks, check_option};
use crate::option::MenuOption;
use crate::pagination::ScrollPolicy;

/// Collects configuration and options, then validates them in
/// [`MenuBuilder::build`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use hudmenu_core::MenuManagerConfiguration;
/// use hudmenu_widgets::{MenuBuilder, MenuOption, ScrollPolicy};
///
/// let menu = MenuBuilder::new("Shop")
///     .scroll_policy(ScrollPolicy::LinearScroll)
///     .option(MenuOption::button("Buy", |_| {}))
///     .build(Arc::new(MenuManagerConfiguration::default()))
///     .unwrap();
/// assert_eq!(menu.options().len(), 1);
/// ```
#[must_use]
pub struct MenuBuilder {
    config: MenuConfiguration,
    overrides: MenuKeybindOverrides,
    options: Vec<MenuOption>,
    hooks: MenuHooks,
}

impl MenuBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            config: MenuConfiguration {
                title: title.into(),
                ..MenuConfiguration::default()
            },
            overrides: MenuKeybindOverrides::default(),
            options: Vec::new(),
            hooks: MenuHooks::default(),
        }
    }

    /// Start from a complete configuration.
    pub fn with_config(config: MenuConfiguration) -> Self {
        Self {
            config,
            ..Self::new(String::new())
        }
    }

    pub fn max_visible_items(mut self, items: usize) -> Self {
        self.config.max_visible_items = items;
        self
    }

    pub fn hide_title(mut self, hide: bool) -> Self {
        self.config.hide_title = hide;
        self
    }

    pub fn hide_footer(mut self, hide: bool) -> Self {
        self.config.hide_footer = hide;
        self
    }

    pub fn auto_increase_visible_items(mut self, enabled: bool) -> Self {
        self.config.auto_increase_visible_items = enabled;
        self
    }

    pub fn play_sound(mut self, play: bool) -> Self {
        self.config.play_sound = play;
        self
    }

    pub fn freeze_player(mut self, freeze: bool) -> Self {
        self.config.freeze_player = freeze;
        self
    }

    /// Close automatically after `seconds`; zero, negative or
    /// unrepresentable delays disable it.
    pub fn auto_close_after(mut self, seconds: f32) -> Self {
        self.config.auto_close_after = if seconds > 0.0 {
            Duration::try_from_secs_f32(seconds)
                .inspect_err(|err| {
                    tracing::warn!(seconds, %err, "auto-close delay out of range, disabling");
                })
                .ok()
        } else {
            None
        };
        self
    }

    pub fn close_on_select(mut self, close: bool) -> Self {
        self.config.close_on_select = close;
        self
    }

    pub fn navigation_color(mut self, color: impl Into<String>) -> Self {
        self.config.navigation_color = color.into();
        self
    }

    pub fn disabled_color(mut self, color: impl Into<String>) -> Self {
        self.config.disabled_color = color.into();
        self
    }

    pub fn scroll_policy(mut self, policy: ScrollPolicy) -> Self {
        self.config.scroll_policy = policy;
        self
    }

    /// Overflow style for options without their own.
    pub fn default_style(mut self, style: HorizontalStyle) -> Self {
        self.config.default_style = Some(style);
        self
    }

    pub fn keybinds(mut self, overrides: MenuKeybindOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn option(mut self, option: MenuOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = MenuOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn on_open(mut self, hook: impl Fn(PlayerId, &Menu) + Send + Sync + 'static) -> Self {
        self.hooks.on_open = Some(Arc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn(PlayerId, &Menu) + Send + Sync + 'static) -> Self {
        self.hooks.on_close = Some(Arc::new(hook));
        self
    }

    pub fn on_hover(mut self, hook: impl Fn(PlayerId, &MenuOption) + Send + Sync + 'static) -> Self {
        self.hooks.on_hover = Some(Arc::new(hook));
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// [`MenuError::KeyBindingConflict`] when two button-mode actions share
    /// a key after overrides, [`MenuError::EmptyChoices`] for a choice
    /// option without candidates.
    pub fn build(self, manager: Arc<MenuManagerConfiguration>) -> Result<Arc<Menu>, MenuError> {
        let profile = match manager.input_mode {
            InputMode::Wasd => KeyProfile::wasd(),
            InputMode::Button => {
                let profile = KeyProfile::resolve(&self.overrides, &manager.default_profile());
                profile.validate(&self.config.title)?;
                profile
            }
        };
        for option in &self.options {
            check_option(option)?;
        }
        tracing::debug!(
            title = %self.config.title,
            options = self.options.len(),
            mode = ?manager.input_mode,
            "menu built"
        );
        Ok(Arc::new(Menu::new(
            self.config,
            manager,
            self.overrides,
            profile,
            self.options,
            self.hooks,
        )))
    }
}
