//! Shared doubles for runtime integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use hudmenu_core::{
    AudioFeedback, DisplaySink, Host, MenuManagerConfiguration, PlayerControl, PlayerId,
};
use hudmenu_runtime::{ManualScheduler, MenuNavigator, Scheduler};
use parking_lot::Mutex;

/// Host double that records every call.
#[derive(Default)]
pub struct RecordingHost {
    texts: Mutex<HashMap<PlayerId, String>>,
    clears: Mutex<Vec<PlayerId>>,
    frozen: Mutex<HashMap<PlayerId, bool>>,
    sounds: Mutex<Vec<(PlayerId, String)>>,
    invalid: Mutex<HashSet<PlayerId>>,
}

impl RecordingHost {
    pub fn text(&self, player: PlayerId) -> Option<String> {
        self.texts.lock().get(&player).cloned()
    }

    pub fn clears(&self, player: PlayerId) -> usize {
        self.clears.lock().iter().filter(|&&p| p == player).count()
    }

    pub fn is_frozen(&self, player: PlayerId) -> bool {
        self.frozen.lock().get(&player).copied().unwrap_or(false)
    }

    pub fn sounds(&self, player: PlayerId) -> Vec<String> {
        self.sounds
            .lock()
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn invalidate(&self, player: PlayerId) {
        self.invalid.lock().insert(player);
    }
}

impl DisplaySink for RecordingHost {
    fn set_text(&self, player: PlayerId, markup: &str) {
        self.texts.lock().insert(player, markup.to_owned());
    }

    fn clear_text(&self, player: PlayerId) {
        self.texts.lock().remove(&player);
        self.clears.lock().push(player);
    }
}

impl PlayerControl for RecordingHost {
    fn set_movement_frozen(&self, player: PlayerId, frozen: bool) {
        self.frozen.lock().insert(player, frozen);
    }

    fn is_player_valid(&self, player: PlayerId) -> bool {
        !self.invalid.lock().contains(&player)
    }
}

impl AudioFeedback for RecordingHost {
    fn play_sound(&self, player: PlayerId, sound: &str, _volume: f32) {
        self.sounds.lock().push((player, sound.to_owned()));
    }
}

pub struct Harness {
    pub host: Arc<RecordingHost>,
    pub scheduler: Arc<ManualScheduler>,
    pub nav: Arc<MenuNavigator>,
}

pub fn harness(config: MenuManagerConfiguration) -> Harness {
    let host = Arc::new(RecordingHost::default());
    let scheduler = Arc::new(ManualScheduler::new());
    let nav = MenuNavigator::new(
        config,
        Arc::clone(&host) as Arc<dyn Host>,
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
    );
    Harness {
        host,
        scheduler,
        nav,
    }
}
