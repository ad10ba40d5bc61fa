#![forbid(unsafe_code)]

//! Key binds and input profiles.
//!
//! Keys are modelled as a bit set so a single action can be bound to
//! several physical keys. A [`KeyProfile`] maps each [`MenuAction`] to its
//! key mask; two actions of the same profile must never share a bit.

use std::fmt;

use bitflags::bitflags;

use crate::error::MenuError;

bitflags! {
    /// Keys the host reports for menu navigation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyBind: u32 {
        const MOUSE1   = 1 << 0;
        const MOUSE2   = 1 << 1;
        const SPACE    = 1 << 2;
        const CTRL     = 1 << 3;
        const W        = 1 << 4;
        const A        = 1 << 5;
        const S        = 1 << 6;
        const D        = 1 << 7;
        const E        = 1 << 8;
        const ESC      = 1 << 9;
        const R        = 1 << 10;
        const ALT      = 1 << 11;
        const SHIFT    = 1 << 12;
        const WEAPON1  = 1 << 13;
        const WEAPON2  = 1 << 14;
        const GRENADE1 = 1 << 15;
        const GRENADE2 = 1 << 16;
        const TAB      = 1 << 17;
        const F        = 1 << 18;
    }
}

impl KeyBind {
    /// Parse a host key name (`"mouse1"`, `"E"`, `" tab "`) case-insensitively.
    ///
    /// Returns `None` for names outside the known vocabulary.
    #[must_use]
    pub fn parse_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return None;
        }
        Self::from_name(&upper)
    }

    /// Upper-case label used in the menu footer (`"E"`, `"MOUSE1+SHIFT"`).
    #[must_use]
    pub fn label(&self) -> String {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        names.join("+")
    }
}

impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Logical action a key press can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// Move the cursor to the next option.
    MoveForward,
    /// Move the cursor to the previous option.
    MoveBack,
    /// Activate the option under the cursor.
    Select,
    /// Leave the current menu.
    Exit,
}

impl MenuAction {
    /// Stable name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveForward => "Scroll",
            Self::MoveBack => "ScrollBack",
            Self::Select => "Use",
            Self::Exit => "Exit",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional per-menu replacements for the host's default keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuKeybindOverrides {
    pub move_forward: Option<KeyBind>,
    pub move_back: Option<KeyBind>,
    pub select: Option<KeyBind>,
    pub exit: Option<KeyBind>,
}

impl MenuKeybindOverrides {
    #[must_use]
    pub fn move_forward(mut self, key: KeyBind) -> Self {
        self.move_forward = Some(key);
        self
    }

    #[must_use]
    pub fn move_back(mut self, key: KeyBind) -> Self {
        self.move_back = Some(key);
        self
    }

    #[must_use]
    pub fn select(mut self, key: KeyBind) -> Self {
        self.select = Some(key);
        self
    }

    #[must_use]
    pub fn exit(mut self, key: KeyBind) -> Self {
        self.exit = Some(key);
        self
    }

    /// Whether no action is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.move_forward.is_none()
            && self.move_back.is_none()
            && self.select.is_none()
            && self.exit.is_none()
    }
}

/// Fully resolved key masks for the four menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyProfile {
    pub move_forward: KeyBind,
    pub move_back: KeyBind,
    pub select: KeyBind,
    pub exit: KeyBind,
}

impl KeyProfile {
    /// A button-mode profile with explicit keys.
    #[must_use]
    pub const fn button(
        move_forward: KeyBind,
        move_back: KeyBind,
        select: KeyBind,
        exit: KeyBind,
    ) -> Self {
        Self {
            move_forward,
            move_back,
            select,
            exit,
        }
    }

    /// The fixed WASD profile: W back, S forward, D select, A exit.
    #[must_use]
    pub const fn wasd() -> Self {
        Self {
            move_forward: KeyBind::S,
            move_back: KeyBind::W,
            select: KeyBind::D,
            exit: KeyBind::A,
        }
    }

    /// Apply per-menu overrides on top of host defaults.
    #[must_use]
    pub fn resolve(overrides: &MenuKeybindOverrides, defaults: &Self) -> Self {
        Self {
            move_forward: overrides.move_forward.unwrap_or(defaults.move_forward),
            move_back: overrides.move_back.unwrap_or(defaults.move_back),
            select: overrides.select.unwrap_or(defaults.select),
            exit: overrides.exit.unwrap_or(defaults.exit),
        }
    }

    fn bindings(&self) -> [(MenuAction, KeyBind); 4] {
        [
            (MenuAction::MoveForward, self.move_forward),
            (MenuAction::MoveBack, self.move_back),
            (MenuAction::Exit, self.exit),
            (MenuAction::Select, self.select),
        ]
    }

    /// First pair of actions whose key masks overlap, if any.
    #[must_use]
    pub fn first_conflict(&self) -> Option<(MenuAction, MenuAction, KeyBind)> {
        let bindings = self.bindings();
        for (i, &(first, first_keys)) in bindings.iter().enumerate() {
            for &(second, second_keys) in &bindings[i + 1..] {
                let overlap = first_keys & second_keys;
                if !overlap.is_empty() {
                    return Some((first, second, overlap));
                }
            }
        }
        None
    }

    /// Reject profiles where two actions share a key.
    ///
    /// # Errors
    /// Returns [`MenuError::KeyBindingConflict`] naming the first clash.
    pub fn validate(&self, menu: &str) -> Result<(), MenuError> {
        match self.first_conflict() {
            Some((first, second, overlap)) => Err(MenuError::KeyBindingConflict {
                menu: menu.to_owned(),
                first,
                second,
                overlap,
            }),
            None => Ok(()),
        }
    }

    /// Map a pressed key to an action.
    ///
    /// Checked in the order forward, back, exit, select. An empty key never
    /// matches.
    #[must_use]
    pub fn action_for(&self, key: KeyBind) -> Option<MenuAction> {
        if key.is_empty() {
            return None;
        }
        self.bindings()
            .into_iter()
            .find(|(_, mask)| mask.contains(key))
            .map(|(action, _)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> KeyProfile {
        KeyProfile::button(KeyBind::SHIFT, KeyBind::CTRL, KeyBind::E, KeyBind::TAB)
    }

    #[test]
    fn parse_name_is_case_insensitive() {
        assert_eq!(KeyBind::parse_name("mouse1"), Some(KeyBind::MOUSE1));
        assert_eq!(KeyBind::parse_name(" Tab "), Some(KeyBind::TAB));
        assert_eq!(KeyBind::parse_name("e"), Some(KeyBind::E));
    }

    #[test]
    fn parse_name_rejects_unknown() {
        assert_eq!(KeyBind::parse_name("f13"), None);
        assert_eq!(KeyBind::parse_name(""), None);
    }

    #[test]
    fn label_joins_names() {
        assert_eq!(KeyBind::E.label(), "E");
        assert_eq!((KeyBind::MOUSE1 | KeyBind::SHIFT).label(), "MOUSE1+SHIFT");
    }

    #[test]
    fn resolve_prefers_overrides() {
        let overrides = MenuKeybindOverrides::default().select(KeyBind::F);
        let profile = KeyProfile::resolve(&overrides, &defaults());
        assert_eq!(profile.select, KeyBind::F);
        assert_eq!(profile.exit, KeyBind::TAB);
    }

    #[test]
    fn conflict_detected_between_distinct_actions() {
        let overrides = MenuKeybindOverrides::default().exit(KeyBind::E | KeyBind::ESC);
        let profile = KeyProfile::resolve(&overrides, &defaults());
        let err = profile.validate("Shop").unwrap_err();
        match err {
            MenuError::KeyBindingConflict {
                first,
                second,
                overlap,
                ..
            } => {
                assert_eq!(first, MenuAction::Exit);
                assert_eq!(second, MenuAction::Select);
                assert_eq!(overlap, KeyBind::E);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_profile_is_valid() {
        assert!(defaults().validate("Main").is_ok());
        assert!(KeyProfile::wasd().validate("Main").is_ok());
    }

    #[test]
    fn action_for_maps_each_key() {
        let profile = KeyProfile::wasd();
        assert_eq!(profile.action_for(KeyBind::S), Some(MenuAction::MoveForward));
        assert_eq!(profile.action_for(KeyBind::W), Some(MenuAction::MoveBack));
        assert_eq!(profile.action_for(KeyBind::D), Some(MenuAction::Select));
        assert_eq!(profile.action_for(KeyBind::A), Some(MenuAction::Exit));
        assert_eq!(profile.action_for(KeyBind::E), None);
    }

    #[test]
    fn empty_key_never_matches() {
        assert_eq!(defaults().action_for(KeyBind::empty()), None);
    }

    #[test]
    fn multi_key_mask_matches_any_member() {
        let profile = KeyProfile::button(
            KeyBind::SHIFT | KeyBind::MOUSE1,
            KeyBind::CTRL,
            KeyBind::E,
            KeyBind::TAB,
        );
        assert_eq!(profile.action_for(KeyBind::MOUSE1), Some(MenuAction::MoveForward));
    }
}
