#![forbid(unsafe_code)]

//! Host-level menu settings.
//!
//! A [`MenuManagerConfiguration`] is either deserialized (serde, every field
//! defaulted) or parsed from the host's settings blob with
//! [`MenuManagerConfiguration::from_settings_blob`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::SoundCue;
use crate::keybind::{KeyBind, KeyProfile};

/// Field separator of the settings blob.
pub const SETTINGS_SEPARATOR: char = '\x01';

const BLOB_FIELDS: [&str; 13] = [
    "navigation_prefix",
    "input_mode",
    "buttons_use",
    "buttons_scroll",
    "buttons_scroll_back",
    "buttons_exit",
    "sound_use_name",
    "sound_use_volume",
    "sound_scroll_name",
    "sound_scroll_volume",
    "sound_exit_name",
    "sound_exit_volume",
    "items_per_page",
];

/// How key presses map to menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Configurable keys per action.
    #[default]
    Button,
    /// Fixed W/S/D/A layout.
    Wasd,
}

impl FromStr for InputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "button" => Ok(Self::Button),
            "wasd" => Ok(Self::Wasd),
            other => Err(ConfigError::UnknownInputMode(other.to_owned())),
        }
    }
}

/// A named sound and the volume to play it at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    pub name: String,
    pub volume: f32,
}

impl SoundSettings {
    #[must_use]
    pub fn new(name: impl Into<String>, volume: f32) -> Self {
        Self {
            name: name.into(),
            volume,
        }
    }

    /// An empty name disables the cue.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.name.is_empty() && self.volume > 0.0
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            volume: 1.0,
        }
    }
}

/// Settings shared by every menu of one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuManagerConfiguration {
    /// Glyph drawn in front of the option under the cursor.
    pub navigation_prefix: String,
    pub input_mode: InputMode,
    pub buttons_use: String,
    pub buttons_scroll: String,
    pub buttons_scroll_back: String,
    pub buttons_exit: String,
    pub sound_use: SoundSettings,
    pub sound_scroll: SoundSettings,
    pub sound_exit: SoundSettings,
    /// Visible rows when a menu does not set its own.
    pub items_per_page: usize,
    /// Frequency of the markup render pass.
    pub render_rate_hz: u32,
}

impl Default for MenuManagerConfiguration {
    fn default() -> Self {
        Self {
            navigation_prefix: "➤".to_owned(),
            input_mode: InputMode::Button,
            buttons_use: "e".to_owned(),
            buttons_scroll: "shift".to_owned(),
            buttons_scroll_back: "ctrl".to_owned(),
            buttons_exit: "tab".to_owned(),
            sound_use: SoundSettings::new("Menu.Select", 1.0),
            sound_scroll: SoundSettings::new("Menu.Scroll", 1.0),
            sound_exit: SoundSettings::new("Menu.Exit", 1.0),
            items_per_page: 5,
            render_rate_hz: 32,
        }
    }
}

impl MenuManagerConfiguration {
    /// Parse the thirteen `\x01`-separated fields supplied by the host.
    ///
    /// Fields beyond the thirteenth are ignored. The render rate is not part
    /// of the blob and keeps its default.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a field is missing, a number does not
    /// parse, or the input mode is unknown.
    pub fn from_settings_blob(blob: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = blob.split(SETTINGS_SEPARATOR).collect();
        let field = |index: usize| -> Result<&str, ConfigError> {
            parts.get(index).copied().ok_or(ConfigError::MissingField {
                index,
                name: BLOB_FIELDS[index],
            })
        };
        let volume = |index: usize| -> Result<f32, ConfigError> {
            let raw = field(index)?;
            raw.trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: BLOB_FIELDS[index],
                    value: raw.to_owned(),
                })
        };

        let items_raw = field(12)?;
        let items_per_page =
            items_raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: BLOB_FIELDS[12],
                    value: items_raw.to_owned(),
                })?;

        let config = Self {
            navigation_prefix: field(0)?.to_owned(),
            input_mode: field(1)?.parse()?,
            buttons_use: field(2)?.to_owned(),
            buttons_scroll: field(3)?.to_owned(),
            buttons_scroll_back: field(4)?.to_owned(),
            buttons_exit: field(5)?.to_owned(),
            sound_use: SoundSettings::new(field(6)?, volume(7)?),
            sound_scroll: SoundSettings::new(field(8)?, volume(9)?),
            sound_exit: SoundSettings::new(field(10)?, volume(11)?),
            items_per_page,
            render_rate_hz: Self::default().render_rate_hz,
        };
        tracing::debug!(
            input_mode = ?config.input_mode,
            items_per_page = config.items_per_page,
            "parsed menu settings blob"
        );
        Ok(config)
    }

    /// Default key profile for menus without overrides.
    ///
    /// Unknown key names resolve to the empty set and are logged.
    #[must_use]
    pub fn default_profile(&self) -> KeyProfile {
        match self.input_mode {
            InputMode::Wasd => KeyProfile::wasd(),
            InputMode::Button => KeyProfile::button(
                key_or_warn("buttons_scroll", &self.buttons_scroll),
                key_or_warn("buttons_scroll_back", &self.buttons_scroll_back),
                key_or_warn("buttons_use", &self.buttons_use),
                key_or_warn("buttons_exit", &self.buttons_exit),
            ),
        }
    }

    #[must_use]
    pub fn sound(&self, cue: SoundCue) -> &SoundSettings {
        match cue {
            SoundCue::Use => &self.sound_use,
            SoundCue::Scroll => &self.sound_scroll,
            SoundCue::Exit => &self.sound_exit,
        }
    }
}

fn key_or_warn(field: &str, name: &str) -> KeyBind {
    KeyBind::parse_name(name).unwrap_or_else(|| {
        tracing::warn!(field, name, "unknown key name, binding nothing");
        KeyBind::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(fields: &[&str]) -> String {
        fields.join("\x01")
    }

    const SAMPLE: [&str; 13] = [
        ">", "button", "e", "shift", "ctrl", "tab", "use.wav", "0.5", "scroll.wav", "0.25",
        "exit.wav", "1", "6",
    ];

    #[test]
    fn parses_full_blob() {
        let config = MenuManagerConfiguration::from_settings_blob(&blob(&SAMPLE)).unwrap();
        assert_eq!(config.navigation_prefix, ">");
        assert_eq!(config.input_mode, InputMode::Button);
        assert_eq!(config.sound_scroll, SoundSettings::new("scroll.wav", 0.25));
        assert_eq!(config.items_per_page, 6);
        assert_eq!(config.render_rate_hz, 32);
    }

    #[test]
    fn missing_field_reports_index() {
        let err = MenuManagerConfiguration::from_settings_blob(&blob(&SAMPLE[..10])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                index: 10,
                name: "sound_exit_name"
            }
        );
    }

    #[test]
    fn bad_number_is_rejected() {
        let mut fields = SAMPLE;
        fields[12] = "many";
        let err = MenuManagerConfiguration::from_settings_blob(&blob(&fields)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "items_per_page", .. }));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let mut fields = SAMPLE;
        fields[1] = "arrows";
        let err = MenuManagerConfiguration::from_settings_blob(&blob(&fields)).unwrap_err();
        assert_eq!(err, ConfigError::UnknownInputMode("arrows".into()));
    }

    #[test]
    fn default_profile_uses_button_names() {
        let profile = MenuManagerConfiguration::default().default_profile();
        assert_eq!(profile.select, KeyBind::E);
        assert_eq!(profile.move_forward, KeyBind::SHIFT);
        assert_eq!(profile.move_back, KeyBind::CTRL);
        assert_eq!(profile.exit, KeyBind::TAB);
    }

    #[test]
    fn wasd_profile_ignores_button_names() {
        let config = MenuManagerConfiguration {
            input_mode: InputMode::Wasd,
            ..Default::default()
        };
        assert_eq!(config.default_profile(), KeyProfile::wasd());
    }

    #[tracing_test::traced_test]
    #[test]
    fn unknown_key_binds_nothing_and_warns() {
        let config = MenuManagerConfiguration {
            buttons_use: "f13".into(),
            ..Default::default()
        };
        assert!(config.default_profile().select.is_empty());
        assert!(logs_contain("unknown key name"));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: MenuManagerConfiguration =
            serde_json::from_str(r#"{"input_mode":"wasd","items_per_page":3}"#).unwrap();
        assert_eq!(config.input_mode, InputMode::Wasd);
        assert_eq!(config.items_per_page, 3);
        assert_eq!(config.navigation_prefix, "➤");
    }
}
