#![forbid(unsafe_code)]

//! Per-player menu hierarchy and input handling.
//!
//! [`MenuNavigator`] tracks which menu each player has open, maps key
//! presses onto [`MenuAction`]s, drives option activation and owns the
//! two loops: the fixed-rate render pass ([`MenuNavigator::render_frame`])
//! and the host-tick flush ([`MenuNavigator::tick`]).
//!
//! # Hierarchy
//!
//! Opening a submenu links it to the menu and option it came from. Leaving
//! the submenu reopens the parent with the cursor back on that option and
//! without running the parent's open hooks again. Opening an unrelated
//! menu, disconnecting or [`MenuNavigator::close_all_menus`] close the
//! whole chain.

use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Weak};
use std::time::Duration;

use hudmenu_core::{
    Host, KeyEvent, MenuAction, MenuError, MenuManagerConfiguration, PlayerId, SoundCue,
    TimerHandle,
};
use hudmenu_widgets::{Activation, Menu, MenuBuilder, MenuOption, OptionId};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::render_loop::{RenderLoop, frame_callback};
use crate::scheduler::Scheduler;
use crate::task::{self, TaskCompletion};

/// Navigator-level open/close observer.
pub type NavigatorHook = Arc<dyn Fn(PlayerId, &Arc<Menu>) + Send + Sync>;

#[derive(Default)]
struct NavigatorHooks {
    on_menu_opened: Option<NavigatorHook>,
    on_menu_closed: Option<NavigatorHook>,
}

/// Owns every player's active menu.
pub struct MenuNavigator {
    config: Arc<MenuManagerConfiguration>,
    host: Arc<dyn Host>,
    scheduler: Arc<dyn Scheduler>,
    active: RwLock<FxHashMap<PlayerId, Arc<Menu>>>,
    completions_tx: mpsc::Sender<TaskCompletion>,
    completions_rx: Mutex<mpsc::Receiver<TaskCompletion>>,
    hooks: RwLock<NavigatorHooks>,
    render_loop: Mutex<Option<RenderLoop>>,
    this: Weak<MenuNavigator>,
}

impl MenuNavigator {
    pub fn new(
        config: MenuManagerConfiguration,
        host: Arc<dyn Host>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Arc<Self> {
        let (completions_tx, completions_rx) = mpsc::channel();
        Arc::new_cyclic(|this| Self {
            config: Arc::new(config),
            host,
            scheduler,
            active: RwLock::new(FxHashMap::default()),
            completions_tx,
            completions_rx: Mutex::new(completions_rx),
            hooks: RwLock::new(NavigatorHooks::default()),
            render_loop: Mutex::new(None),
            this: this.clone(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Arc<MenuManagerConfiguration> {
        &self.config
    }

    /// Build a menu against this navigator's host settings.
    pub fn build_menu(&self, builder: MenuBuilder) -> Result<Arc<Menu>, MenuError> {
        builder.build(Arc::clone(&self.config))
    }

    pub fn on_menu_opened(&self, hook: impl Fn(PlayerId, &Arc<Menu>) + Send + Sync + 'static) {
        self.hooks.write().on_menu_opened = Some(Arc::new(hook));
    }

    pub fn on_menu_closed(&self, hook: impl Fn(PlayerId, &Arc<Menu>) + Send + Sync + 'static) {
        self.hooks.write().on_menu_closed = Some(Arc::new(hook));
    }

    #[must_use]
    pub fn current_menu(&self, player: PlayerId) -> Option<Arc<Menu>> {
        self.active.read().get(&player).cloned()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.active.read().len()
    }

    // ── Opening ─────────────────────────────────────────────────────

    /// Show `menu` to `player`.
    ///
    /// A different menu already open is closed first, together with its
    /// parents. Showing the same menu again restarts it, including its
    /// auto-close timer, without a close event.
    pub fn open_menu_for_player(&self, player: PlayerId, menu: &Arc<Menu>) -> bool {
        if !self.host.is_player_valid(player) {
            tracing::debug!(%player, "open ignored for invalid player");
            return false;
        }
        if let Some(current) = self.current_menu(player) {
            if !Arc::ptr_eq(&current, menu) {
                self.close_chain(player);
            }
        }
        self.active.write().insert(player, Arc::clone(menu));
        self.show(player, menu, true)
    }

    /// Open `submenu` from `option` of `parent`, which stays linked as the
    /// place to return to. The parent's close hooks do not run.
    pub fn open_submenu(
        &self,
        player: PlayerId,
        submenu: &Arc<Menu>,
        parent: &Arc<Menu>,
        option: OptionId,
    ) -> bool {
        if let Err(err) = submenu.set_parent(parent, option) {
            tracing::warn!(%player, error = %err, "submenu link rejected");
            return false;
        }
        parent.close_for(player);
        if parent.config().freeze_player && !submenu.config().freeze_player {
            self.host.set_movement_frozen(player, false);
        }
        self.active.write().insert(player, Arc::clone(submenu));
        tracing::debug!(%player, parent = %parent.id(), submenu = %submenu.id(), "submenu opened");
        self.show(player, submenu, true)
    }

    fn show(&self, player: PlayerId, menu: &Arc<Menu>, announce: bool) -> bool {
        let timer = menu
            .config()
            .auto_close_after
            .map(|delay| self.schedule_auto_close(player, menu, delay));
        if !menu.show_for(player, timer) {
            self.forget_if_active(player, menu);
            return false;
        }
        if menu.config().freeze_player {
            self.host.set_movement_frozen(player, true);
        }
        if announce {
            menu.notify_opened(player);
            let hook = self.hooks.read().on_menu_opened.clone();
            if let Some(hook) = hook {
                hook(player, menu);
            }
        }
        self.refresh(player, menu);
        true
    }

    fn schedule_auto_close(&self, player: PlayerId, menu: &Arc<Menu>, delay: Duration) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer_id = handle.id();
        let navigator = self.this.clone();
        let target = Arc::downgrade(menu);
        self.scheduler.schedule(
            handle.clone(),
            delay,
            Box::new(move || {
                let (Some(navigator), Some(menu)) = (navigator.upgrade(), target.upgrade()) else {
                    return;
                };
                navigator.auto_close_fired(player, &menu, timer_id);
            }),
        );
        tracing::debug!(%player, menu = %menu.id(), timer = timer_id, ?delay, "auto-close scheduled");
        handle
    }

    fn auto_close_fired(&self, player: PlayerId, menu: &Arc<Menu>, timer_id: u64) {
        if !menu.auto_close_matches(player, timer_id) {
            tracing::trace!(%player, timer = timer_id, "stale auto-close skipped");
            return;
        }
        let is_current = self.current_menu(player).is_some_and(|m| Arc::ptr_eq(&m, menu));
        if is_current {
            tracing::debug!(%player, menu = %menu.id(), "auto-close fired");
            self.close_menu_for_player(player);
        } else {
            menu.close_for(player);
        }
    }

    // ── Closing ─────────────────────────────────────────────────────

    /// Leave the current menu. A linked parent is reopened.
    pub fn close_menu_for_player(&self, player: PlayerId) -> bool {
        let Some(menu) = self.active.write().remove(&player) else {
            return false;
        };
        self.teardown(player, &menu);
        if let Some((parent, option)) = menu.parent() {
            if self.host.is_player_valid(player) && !parent.is_disposed() {
                self.active.write().insert(player, Arc::clone(&parent));
                if self.show(player, &parent, false) {
                    parent.move_to_option(player, option);
                    self.refresh(player, &parent);
                }
            }
        }
        true
    }

    /// Close every open menu chain, firing a close event for each menu.
    pub fn close_all_menus(&self) {
        let players: Vec<PlayerId> = self.active.read().keys().copied().collect();
        for player in players {
            self.close_chain(player);
        }
    }

    /// Close the player's menus and drop their per-player option values.
    pub fn on_player_disconnected(&self, player: PlayerId) {
        let mut cursor = self.current_menu(player);
        while let Some(menu) = cursor {
            menu.forget_player(player);
            cursor = menu.parent().map(|(parent, _)| parent);
        }
        self.close_chain(player);
        tracing::debug!(%player, "player disconnected");
    }

    /// Dispose `menu`, closing it for every player that has it open.
    pub fn dispose_menu(&self, menu: &Arc<Menu>) {
        let holders: Vec<PlayerId> = self
            .active
            .read()
            .iter()
            .filter(|(_, m)| Arc::ptr_eq(m, menu))
            .map(|(&p, _)| p)
            .collect();
        for player in holders {
            let removed = self.active.write().remove(&player);
            if let Some(current) = removed {
                self.teardown(player, &current);
            }
        }
        for player in menu.dispose() {
            self.release_player(player, menu);
        }
    }

    fn close_chain(&self, player: PlayerId) {
        let Some(menu) = self.active.write().remove(&player) else {
            return;
        };
        let mut cursor = Some(menu);
        while let Some(menu) = cursor {
            self.teardown(player, &menu);
            cursor = menu.parent().map(|(parent, _)| parent);
        }
    }

    fn teardown(&self, player: PlayerId, menu: &Arc<Menu>) {
        menu.close_for(player);
        self.release_player(player, menu);
        menu.notify_closed(player);
        let hook = self.hooks.read().on_menu_closed.clone();
        if let Some(hook) = hook {
            hook(player, menu);
        }
    }

    fn release_player(&self, player: PlayerId, menu: &Menu) {
        if !self.host.is_player_valid(player) {
            return;
        }
        if menu.config().freeze_player {
            self.host.set_movement_frozen(player, false);
        }
        self.host.clear_text(player);
    }

    fn forget_if_active(&self, player: PlayerId, menu: &Arc<Menu>) {
        let mut active = self.active.write();
        if active.get(&player).is_some_and(|m| Arc::ptr_eq(m, menu)) {
            active.remove(&player);
        }
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Apply one key event. Returns whether it mapped onto a menu action.
    pub fn handle_key(&self, event: KeyEvent) -> bool {
        if !event.is_actionable() {
            return false;
        }
        let player = event.player;
        let Some(menu) = self.current_menu(player) else {
            return false;
        };
        if !self.host.is_player_valid(player) {
            return false;
        }
        let Some(action) = menu.key_profile().action_for(event.key) else {
            return false;
        };
        tracing::trace!(%player, action = action.name(), "menu input");
        match action {
            MenuAction::MoveForward | MenuAction::MoveBack => {
                let delta = if action == MenuAction::MoveForward { 1 } else { -1 };
                menu.move_by(player, delta);
                self.play(player, &menu, SoundCue::Scroll);
                self.refresh(player, &menu);
            }
            MenuAction::Exit => {
                self.close_menu_for_player(player);
                self.play(player, &menu, SoundCue::Exit);
            }
            MenuAction::Select => self.select(player, &menu),
        }
        true
    }

    fn select(&self, player: PlayerId, menu: &Arc<Menu>) {
        let Some(option) = menu.current_option(player) else {
            return;
        };
        let activation = option.activate(player);
        tracing::debug!(%player, option = %option.id(), ?activation, "option selected");
        if activation.is_accepted() && option.plays_sound() {
            self.play(player, menu, SoundCue::Use);
        }
        match activation {
            Activation::Ignored | Activation::Rejected | Activation::Busy => self.refresh(player, menu),
            Activation::Changed | Activation::Clicked => self.after_handler(player, menu, &option),
            Activation::OpenSubmenu(submenu) => {
                self.open_submenu(player, &submenu, menu, option.id());
            }
            Activation::Spawn(job) => {
                self.refresh(player, menu);
                task::spawn(job, menu, self.completions_tx.clone());
            }
        }
    }

    fn after_handler(&self, player: PlayerId, menu: &Arc<Menu>, option: &MenuOption) {
        let still_open = self.current_menu(player).is_some_and(|m| Arc::ptr_eq(&m, menu));
        if !still_open {
            return;
        }
        if menu.closes_after(option) {
            self.close_menu_for_player(player);
        } else {
            self.refresh(player, menu);
        }
    }

    fn play(&self, player: PlayerId, menu: &Menu, cue: SoundCue) {
        if !menu.config().play_sound {
            return;
        }
        let sound = self.config.sound(cue);
        if sound.is_enabled() {
            self.host.play_sound(player, &sound.name, sound.volume);
        }
    }

    /// Re-render for input feedback without advancing scroll animations.
    fn refresh(&self, player: PlayerId, menu: &Menu) {
        if let Some(markup) = menu.render_for(player, false) {
            self.host.set_text(player, &markup);
        }
    }

    // ── Loops ───────────────────────────────────────────────────────

    /// One render pass: recompute every open menu into its cache and
    /// advance scrolling labels.
    pub fn render_frame(&self) {
        let open: Vec<(PlayerId, Arc<Menu>)> =
            self.active.read().iter().map(|(&p, m)| (p, Arc::clone(m))).collect();
        for (player, menu) in open {
            menu.render_for(player, true);
        }
    }

    /// Host tick: apply finished async handlers, then push cached markup
    /// to the display sink.
    pub fn tick(&self) {
        self.drain_completions();
        let open: Vec<(PlayerId, Arc<Menu>)> =
            self.active.read().iter().map(|(&p, m)| (p, Arc::clone(m))).collect();
        for (player, menu) in open {
            let markup = menu
                .cached_render(player)
                .or_else(|| menu.render_for(player, false));
            if let Some(markup) = markup {
                self.host.set_text(player, &markup);
            }
        }
    }

    fn drain_completions(&self) {
        let completions: Vec<TaskCompletion> = {
            let rx = self.completions_rx.lock();
            rx.try_iter().collect()
        };
        for completion in completions {
            completion.job.finish();
            let player = completion.job.player();
            let Some(menu) = completion.menu.upgrade() else {
                continue;
            };
            let still_open = self.current_menu(player).is_some_and(|m| Arc::ptr_eq(&m, &menu));
            if !still_open {
                tracing::trace!(%player, "completion for closed menu skipped");
                continue;
            }
            match completion.outcome {
                Ok(()) => self.after_handler(player, &menu, completion.job.option()),
                Err(fault) => {
                    tracing::warn!(%player, fault = %fault, "async option failed");
                    self.refresh(player, &menu);
                }
            }
        }
    }

    /// Start the fixed-rate render loop at the configured rate. Replaces a
    /// loop already running.
    pub fn start_render_loop(&self) {
        let navigator = self.this.clone();
        let render = RenderLoop::start(
            self.scheduler.as_ref(),
            self.config.render_rate_hz,
            frame_callback(move || {
                if let Some(navigator) = navigator.upgrade() {
                    navigator.render_frame();
                }
            }),
        );
        *self.render_loop.lock() = Some(render);
    }

    pub fn stop_render_loop(&self) {
        if let Some(render) = self.render_loop.lock().take() {
            render.stop();
        }
    }

    #[must_use]
    pub fn is_render_loop_running(&self) -> bool {
        self.render_loop.lock().as_ref().is_some_and(RenderLoop::is_running)
    }
}

impl fmt::Debug for MenuNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuNavigator")
            .field("open", &self.open_count())
            .field("input_mode", &self.config.input_mode)
            .finish_non_exhaustive()
    }
}

impl Drop for MenuNavigator {
    fn drop(&mut self) {
        if let Some(render) = self.render_loop.get_mut().take() {
            render.stop();
        }
    }
}
