//! Drives a menu through nothing but the facade.

use std::collections::HashMap;
use std::sync::Arc;

use hudmenu::prelude::*;
use hudmenu::{AudioFeedback, DisplaySink, ManualScheduler, PlayerControl, Scheduler};
use parking_lot::Mutex;

#[derive(Default)]
struct Screen {
    texts: Mutex<HashMap<PlayerId, String>>,
}

impl DisplaySink for Screen {
    fn set_text(&self, player: PlayerId, markup: &str) {
        self.texts.lock().insert(player, markup.to_owned());
    }

    fn clear_text(&self, player: PlayerId) {
        self.texts.lock().remove(&player);
    }
}

impl PlayerControl for Screen {
    fn set_movement_frozen(&self, _player: PlayerId, _frozen: bool) {}

    fn is_player_valid(&self, _player: PlayerId) -> bool {
        true
    }
}

impl AudioFeedback for Screen {
    fn play_sound(&self, _player: PlayerId, _sound: &str, _volume: f32) {}
}

#[test]
fn wasd_menu_from_json_settings() -> Result<()> {
    let config: MenuManagerConfiguration =
        serde_json::from_str(r#"{ "input_mode": "wasd", "navigation_prefix": ">" }"#)
            .expect("settings json");
    assert_eq!(config.input_mode, InputMode::Wasd);

    let screen = Arc::new(Screen::default());
    let scheduler = Arc::new(ManualScheduler::new());
    let nav = MenuNavigator::new(
        config,
        Arc::clone(&screen) as Arc<dyn Host>,
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
    );
    let menu = nav.build_menu(
        MenuBuilder::new("Shop")
            .option(MenuOption::button("Buy", |_| {}))
            .option(MenuOption::toggle("Confirm", true)),
    )?;

    let player = PlayerId(3);
    assert!(nav.open_menu_for_player(player, &menu));
    assert!(nav.handle_key(KeyEvent::press(player, KeyBind::S)));
    let text = screen.texts.lock().get(&player).cloned().unwrap_or_default();
    assert!(text.contains("Confirm"));
    assert!(text.contains("Move:</font> W/S"));

    assert!(nav.handle_key(KeyEvent::press(player, KeyBind::A)));
    assert!(nav.current_menu(player).is_none());
    assert!(!screen.texts.lock().contains_key(&player));
    Ok(())
}

#[test]
fn conflicting_keys_surface_as_menu_error() {
    let nav = MenuNavigator::new(
        MenuManagerConfiguration::default(),
        Arc::new(Screen::default()) as Arc<dyn Host>,
        Arc::new(ManualScheduler::new()) as Arc<dyn Scheduler>,
    );
    let overrides = hudmenu::MenuKeybindOverrides::default()
        .select(KeyBind::SHIFT)
        .move_forward(KeyBind::SHIFT);
    let result: Result<_> = nav
        .build_menu(MenuBuilder::new("Clash").keybinds(overrides))
        .map_err(Error::from);
    assert!(matches!(result, Err(Error::Menu(_))));
}
