#![forbid(unsafe_code)]

//! Error types surfaced at build and configuration time.
//!
//! Runtime conditions (stale indices, rejected validation, empty menus) are
//! recovered where they occur and never become error values.

use std::fmt;

use crate::keybind::{KeyBind, MenuAction};

/// A menu could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// Two actions of the resolved key profile share at least one key.
    KeyBindingConflict {
        /// Title of the offending menu.
        menu: String,
        first: MenuAction,
        second: MenuAction,
        /// Keys bound to both actions.
        overlap: KeyBind,
    },
    /// The parent link would make a menu its own ancestor.
    SelfParent { menu: String },
    /// A choice option was declared without candidates.
    EmptyChoices { option: String },
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyBindingConflict {
                menu,
                first,
                second,
                overlap,
            } => write!(
                f,
                "menu '{menu}': {first} and {second} are both bound to {overlap}"
            ),
            Self::SelfParent { menu } => {
                write!(f, "menu '{menu}' cannot be its own parent")
            }
            Self::EmptyChoices { option } => {
                write!(f, "choice option '{option}' has no candidates")
            }
        }
    }
}

impl std::error::Error for MenuError {}

/// The host settings could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The settings blob ended before the named field.
    MissingField { index: usize, name: &'static str },
    /// A numeric field did not parse.
    InvalidNumber { name: &'static str, value: String },
    /// Input mode was neither `button` nor `wasd`.
    UnknownInputMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { index, name } => {
                write!(f, "settings field {index} ({name}) is missing")
            }
            Self::InvalidNumber { name, value } => {
                write!(f, "settings field {name} is not a number: {value:?}")
            }
            Self::UnknownInputMode(mode) => write!(f, "unknown input mode: {mode:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_actions() {
        let err = MenuError::KeyBindingConflict {
            menu: "Shop".into(),
            first: MenuAction::Exit,
            second: MenuAction::Select,
            overlap: KeyBind::E,
        };
        assert_eq!(err.to_string(), "menu 'Shop': Exit and Use are both bound to E");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidNumber {
            name: "items_per_page",
            value: "five".into(),
        };
        assert!(err.to_string().contains("items_per_page"));
        assert_eq!(
            ConfigError::UnknownInputMode("arrows".into()).to_string(),
            "unknown input mode: \"arrows\""
        );
    }
}
