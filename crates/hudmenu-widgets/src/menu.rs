#![forbid(unsafe_code)]

//! Menu definitions and their per-player state.
//!
//! A [`Menu`] owns its options and one [`PlayerMenuState`] per player it is
//! shown to. The option list and each player's state are locked
//! separately; code that needs both always takes the option lock first.
//!
//! Option callbacks (text providers, visibility and enabled predicates,
//! format hooks) may call back into their own menu. Navigation and
//! rendering therefore work on a snapshot of the list and never hold a
//! menu lock while user code runs.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use hudmenu_core::{
    InputMode, KeyProfile, MenuError, MenuKeybindOverrides, MenuManagerConfiguration, PlayerId,
    TimerHandle,
};
use hudmenu_text::{HorizontalStyle, TextEffectEngine};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::option::{MenuOption, OptionId, OptionKind, OptionRenderContext};
use crate::option_set::MenuOptionSet;
use crate::pagination::{ScrollPolicy, paginate, remap_desired};
use crate::player_state::PlayerMenuState;
use crate::render;

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

const MAX_AUTO_INCREASED_ITEMS: usize = 7;
const MAX_VISIBLE_ITEMS: usize = 5;

/// Process-unique identity of a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuId(u64);

impl MenuId {
    fn next() -> Self {
        Self(NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Per-menu presentation and behaviour settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfiguration {
    pub title: String,
    /// Rows in the visible window. Zero uses the host's `items_per_page`.
    pub max_visible_items: usize,
    pub hide_title: bool,
    pub hide_footer: bool,
    /// Give hidden title and footer lines to extra option rows.
    pub auto_increase_visible_items: bool,
    pub play_sound: bool,
    pub freeze_player: bool,
    /// Close automatically after this long. `None` keeps the menu open.
    pub auto_close_after: Option<Duration>,
    /// Default for options that do not set `close_after_select`.
    pub close_on_select: bool,
    pub navigation_color: String,
    pub disabled_color: String,
    pub scroll_policy: ScrollPolicy,
    pub default_style: Option<HorizontalStyle>,
}

impl Default for MenuConfiguration {
    fn default() -> Self {
        Self {
            title: String::new(),
            max_visible_items: 0,
            hide_title: false,
            hide_footer: false,
            auto_increase_visible_items: true,
            play_sound: true,
            freeze_player: false,
            auto_close_after: None,
            close_on_select: false,
            navigation_color: "#FFFFFF".to_owned(),
            disabled_color: "#666666".to_owned(),
            scroll_policy: ScrollPolicy::default(),
            default_style: None,
        }
    }
}

impl MenuConfiguration {
    /// Rows shown at once for a host configured with `items_per_page`.
    #[must_use]
    pub fn effective_visible_items(&self, items_per_page: usize) -> usize {
        let base = if self.max_visible_items == 0 {
            items_per_page
        } else {
            self.max_visible_items
        };
        if self.auto_increase_visible_items {
            let bonus = usize::from(self.hide_title) + usize::from(self.hide_footer);
            (base + bonus).clamp(1, MAX_AUTO_INCREASED_ITEMS)
        } else {
            base.clamp(1, MAX_VISIBLE_ITEMS)
        }
    }
}

pub type MenuHook = Arc<dyn Fn(PlayerId, &Menu) + Send + Sync>;
pub type HoverHook = Arc<dyn Fn(PlayerId, &MenuOption) + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct MenuHooks {
    pub(crate) on_open: Option<MenuHook>,
    pub(crate) on_close: Option<MenuHook>,
    pub(crate) on_hover: Option<HoverHook>,
}

struct MenuParent {
    menu: Weak<Menu>,
    option: OptionId,
}

/// One player's view of the menu, copied out of the locks.
struct CursorSnapshot {
    state: Arc<Mutex<PlayerMenuState>>,
    options: Vec<Arc<MenuOption>>,
    desired: usize,
    revision: u64,
}

/// Where the cursor of one player resolves to in the filtered list.
struct Resolution {
    /// Unfiltered indices of options the player can see.
    visible: Vec<usize>,
    /// Position within `visible` of the option under the cursor.
    position: Option<usize>,
}

fn resolve(options: &[Arc<MenuOption>], player: PlayerId, desired: usize) -> Resolution {
    let visible: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_visible_for(player))
        .map(|(i, _)| i)
        .collect();
    let selectable: Vec<usize> = visible
        .iter()
        .copied()
        .filter(|&i| options[i].is_selectable())
        .collect();
    let position = remap_desired(&selectable, desired)
        .and_then(|pos| visible.binary_search(&selectable[pos]).ok());
    Resolution { visible, position }
}

/// A titled list of options shown on players' HUDs.
pub struct Menu {
    id: MenuId,
    config: MenuConfiguration,
    manager: Arc<MenuManagerConfiguration>,
    overrides: MenuKeybindOverrides,
    profile: KeyProfile,
    options: MenuOptionSet,
    states: RwLock<FxHashMap<PlayerId, Arc<Mutex<PlayerMenuState>>>>,
    parent: RwLock<Option<MenuParent>>,
    hooks: MenuHooks,
    disposed: AtomicBool,
}

impl Menu {
    pub(crate) fn new(
        config: MenuConfiguration,
        manager: Arc<MenuManagerConfiguration>,
        overrides: MenuKeybindOverrides,
        profile: KeyProfile,
        options: Vec<MenuOption>,
        hooks: MenuHooks,
    ) -> Self {
        let set = MenuOptionSet::new();
        for option in options {
            set.push(Arc::new(option));
        }
        Self {
            id: MenuId::next(),
            config,
            manager,
            overrides,
            profile,
            options: set,
            states: RwLock::new(FxHashMap::default()),
            parent: RwLock::new(None),
            hooks,
            disposed: AtomicBool::new(false),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> MenuId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    #[must_use]
    pub fn config(&self) -> &MenuConfiguration {
        &self.config
    }

    #[must_use]
    pub fn manager_config(&self) -> &MenuManagerConfiguration {
        &self.manager
    }

    #[must_use]
    pub fn keybind_overrides(&self) -> &MenuKeybindOverrides {
        &self.overrides
    }

    /// Key profile after overrides; fixed in WASD mode.
    #[must_use]
    pub fn key_profile(&self) -> &KeyProfile {
        &self.profile
    }

    #[must_use]
    pub fn options(&self) -> &MenuOptionSet {
        &self.options
    }

    #[must_use]
    pub fn visible_items(&self) -> usize {
        self.config.effective_visible_items(self.manager.items_per_page)
    }

    /// Whether selecting `option` should close this menu.
    #[must_use]
    pub fn closes_after(&self, option: &MenuOption) -> bool {
        option.closes_after_select().unwrap_or(self.config.close_on_select)
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // ── Option list ─────────────────────────────────────────────────

    /// Append an option and invalidate every player's render.
    pub fn add_option(&self, option: MenuOption) -> Result<Arc<MenuOption>, MenuError> {
        check_option(&option)?;
        let option = Arc::new(option);
        let index = self.options.push(Arc::clone(&option));
        self.invalidate_all();
        tracing::debug!(menu = %self.id, option = %option.id(), index, "option added");
        Ok(option)
    }

    /// Remove an option; cursors past it shift back by one.
    pub fn remove_option(&self, id: OptionId) -> bool {
        let mut options = self.options.lock();
        let Some(index) = options.iter().position(|o| o.id() == id) else {
            return false;
        };
        options.remove(index);
        self.options.bump_revision();
        let remaining = options.len();
        for state in self.states.read().values() {
            let mut state = state.lock();
            state.option_removed(index, remaining);
            if let Some(effects) = state.effects_mut() {
                effects.forget(id.get());
            }
        }
        tracing::debug!(menu = %self.id, option = %id, index, "option removed");
        true
    }

    /// Drop every player's cached markup.
    pub fn invalidate_all(&self) {
        for state in self.states.read().values() {
            state.lock().invalidate();
        }
    }

    // ── Per-player lifecycle ────────────────────────────────────────

    fn state(&self, player: PlayerId) -> Option<Arc<Mutex<PlayerMenuState>>> {
        self.states.read().get(&player).cloned()
    }

    /// Options and cursor of `player`, with every lock released again.
    fn cursor_snapshot(&self, player: PlayerId) -> Option<CursorSnapshot> {
        let state = self.state(player)?;
        let (options, revision) = {
            let options = self.options.lock();
            (options.clone(), self.options.revision())
        };
        let desired = state.lock().desired_index();
        Some(CursorSnapshot {
            state,
            options,
            desired,
            revision,
        })
    }

    /// Start (or restart) showing this menu to `player`.
    ///
    /// Any previous state is replaced and its auto-close timer cancelled
    /// under the same lock. Returns `false` once the menu is disposed; the
    /// offered timer is cancelled in that case.
    pub fn show_for(&self, player: PlayerId, auto_close: Option<TimerHandle>) -> bool {
        if self.is_disposed() {
            if let Some(timer) = auto_close {
                timer.cancel();
            }
            tracing::debug!(menu = %self.id, %player, "show on disposed menu ignored");
            return false;
        }
        let fresh = Arc::new(Mutex::new(PlayerMenuState::new(auto_close)));
        let previous = self.states.write().insert(player, fresh);
        if let Some(previous) = previous {
            previous.lock().cancel_auto_close();
        }
        tracing::debug!(menu = %self.id, %player, title = %self.config.title, "menu shown");
        true
    }

    /// Stop showing this menu to `player`. `false` if it was not open.
    pub fn close_for(&self, player: PlayerId) -> bool {
        let Some(state) = self.states.write().remove(&player) else {
            return false;
        };
        state.lock().cancel_auto_close();
        tracing::debug!(menu = %self.id, %player, "menu closed");
        true
    }

    #[must_use]
    pub fn is_open_for(&self, player: PlayerId) -> bool {
        self.states.read().contains_key(&player)
    }

    #[must_use]
    pub fn open_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.states.read().keys().copied().collect();
        players.sort_unstable();
        players
    }

    /// Whether `timer_id` is still the live auto-close timer for `player`.
    #[must_use]
    pub fn auto_close_matches(&self, player: PlayerId, timer_id: u64) -> bool {
        self.state(player)
            .is_some_and(|s| s.lock().auto_close().is_some_and(|t| t.id() == timer_id))
    }

    /// Drop per-player option values as well as the open state.
    pub fn forget_player(&self, player: PlayerId) {
        self.close_for(player);
        self.options.with(|options| {
            for option in options {
                option.forget_player(player);
            }
        });
    }

    /// Close for everyone and refuse further shows. Returns the players
    /// that still had the menu open.
    pub fn dispose(&self) -> Vec<PlayerId> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }
        let drained: Vec<(PlayerId, Arc<Mutex<PlayerMenuState>>)> =
            self.states.write().drain().collect();
        let mut players = Vec::with_capacity(drained.len());
        for (player, state) in drained {
            state.lock().cancel_auto_close();
            players.push(player);
        }
        players.sort_unstable();
        tracing::debug!(menu = %self.id, closed = players.len(), "menu disposed");
        players
    }

    // ── Hierarchy ───────────────────────────────────────────────────

    /// Link this menu under `parent`, opened from `option`.
    ///
    /// Fails if `parent` is this menu or has it as an ancestor.
    pub fn set_parent(self: &Arc<Self>, parent: &Arc<Menu>, option: OptionId) -> Result<(), MenuError> {
        let mut cursor = Some(Arc::clone(parent));
        while let Some(menu) = cursor {
            if Arc::ptr_eq(&menu, self) {
                return Err(MenuError::SelfParent {
                    menu: self.config.title.clone(),
                });
            }
            cursor = menu.parent().map(|(menu, _)| menu);
        }
        *self.parent.write() = Some(MenuParent {
            menu: Arc::downgrade(parent),
            option,
        });
        Ok(())
    }

    /// Parent menu and the option that opened this one, if still alive.
    #[must_use]
    pub fn parent(&self) -> Option<(Arc<Menu>, OptionId)> {
        let parent = self.parent.read();
        let link = parent.as_ref()?;
        link.menu.upgrade().map(|menu| (menu, link.option))
    }

    pub fn clear_parent(&self) {
        *self.parent.write() = None;
    }

    // ── Hooks ───────────────────────────────────────────────────────

    pub fn notify_opened(&self, player: PlayerId) {
        if let Some(hook) = &self.hooks.on_open {
            hook(player, self);
        }
    }

    pub fn notify_closed(&self, player: PlayerId) {
        if let Some(hook) = &self.hooks.on_close {
            hook(player, self);
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Cursor position before visibility filtering.
    #[must_use]
    pub fn desired_index(&self, player: PlayerId) -> Option<usize> {
        self.state(player).map(|s| s.lock().desired_index())
    }

    /// Jump toward `index`, wrapped into the list.
    ///
    /// Searches from the target in the direction of travel for the first
    /// option the player can see and select. Returns whether the cursor
    /// ended on such an option.
    pub fn move_to_index(&self, player: PlayerId, index: isize) -> bool {
        let Some(snap) = self.cursor_snapshot(player) else {
            return false;
        };
        let total = snap.options.len();
        if total == 0 {
            return false;
        }
        let target = index.rem_euclid(total as isize) as usize;
        let direction = (target as isize - snap.desired as isize).signum();
        if direction == 0 {
            return true;
        }
        match search(&snap.options, player, target, direction) {
            Some(found) => {
                snap.state.lock().set_desired_index(found);
                true
            }
            None => false,
        }
    }

    /// Move the cursor by `delta` rows, wrapping around the list.
    pub fn move_by(&self, player: PlayerId, delta: isize) -> bool {
        let Some(snap) = self.cursor_snapshot(player) else {
            return false;
        };
        let total = snap.options.len();
        if total == 0 || delta == 0 {
            return false;
        }
        let target = (snap.desired as isize + delta).rem_euclid(total as isize) as usize;
        match search(&snap.options, player, target, delta.signum()) {
            Some(found) => snap.state.lock().set_desired_index(found),
            None => false,
        }
    }

    /// Move the cursor onto the option with `id`.
    pub fn move_to_option(&self, player: PlayerId, id: OptionId) -> bool {
        match self.options.position(id) {
            Some(index) => self.move_to_index(player, index as isize),
            None => false,
        }
    }

    /// The option under the cursor after visibility filtering.
    #[must_use]
    pub fn current_option(&self, player: PlayerId) -> Option<Arc<MenuOption>> {
        let snap = self.cursor_snapshot(player)?;
        let resolution = resolve(&snap.options, player, snap.desired);
        let position = resolution.position?;
        snap.state.lock().set_selected_index(position);
        Some(Arc::clone(&snap.options[resolution.visible[position]]))
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Recompute `player`'s markup and store it in the render cache.
    ///
    /// `advance` moves scrolling labels one tick; input-driven rerenders
    /// pass `false`. `None` if the menu is not open for `player`.
    pub fn render_for(&self, player: PlayerId, advance: bool) -> Option<String> {
        let snap = self.cursor_snapshot(player)?;
        let _span = tracing::debug_span!("menu_render", menu = %self.id, %player).entered();
        let max_visible = self.visible_items();
        let options = &snap.options;

        let resolution = resolve(options, player, snap.desired);
        let total = resolution.visible.len();
        let window = paginate(
            total,
            resolution.position.unwrap_or(0),
            max_visible,
            self.config.scroll_policy,
        );
        let arrow = resolution.position.and(window.arrow);
        let hovered = arrow
            .and_then(|row| window.indices.get(row))
            .map(|&pos| Arc::clone(&options[resolution.visible[pos]]));

        // A concurrent pass keeps the shared engine; this one scrolls a scratch copy.
        let lent = snap.state.lock().take_effects();
        let returned = lent.is_some();
        let mut engine = lent.unwrap_or_else(TextEffectEngine::new);

        let mut rows = Vec::with_capacity(window.len());
        {
            let mut ctx = OptionRenderContext {
                player,
                engine: &mut engine,
                advance,
                navigation_prefix: &self.manager.navigation_prefix,
                navigation_color: &self.config.navigation_color,
                disabled_color: &self.config.disabled_color,
                default_style: self.config.default_style.as_ref(),
            };
            for (row, &pos) in window.indices.iter().enumerate() {
                let body = options[resolution.visible[pos]].display(&mut ctx);
                rows.push(render::row_line(
                    &body,
                    arrow == Some(row),
                    &self.manager.navigation_prefix,
                    &self.config.navigation_color,
                ));
            }
        }

        let title = (!self.config.hide_title).then(|| {
            let counter =
                (total > max_visible).then(|| (resolution.position.unwrap_or(0) + 1, total));
            render::title_line(&self.config.title, counter)
        });
        let footer = (!self.config.hide_footer)
            .then(|| render::footer_line(self.manager.input_mode, &self.profile));
        let markup = render::assemble(title.as_deref(), &rows, footer.as_deref());

        {
            let mut state = snap.state.lock();
            if returned {
                state.restore_effects(engine);
            }
            // A cursor move or list change during the pass makes this markup stale.
            let current = state.desired_index() == snap.desired
                && self.options.revision() == snap.revision;
            if current {
                if let Some(position) = resolution.position {
                    state.set_selected_index(position);
                }
                state.store_render(markup.clone());
            }
        }

        if let (Some(hook), Some(option)) = (&self.hooks.on_hover, hovered) {
            hook(player, &*option);
        }
        Some(markup)
    }

    /// Last markup stored for `player`, if still valid.
    #[must_use]
    pub fn cached_render(&self, player: PlayerId) -> Option<String> {
        self.state(player)?.lock().render_cache().map(str::to_owned)
    }

    /// Input mode the footer and key mapping follow.
    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.manager.input_mode
    }
}

fn search(options: &[Arc<MenuOption>], player: PlayerId, target: usize, direction: isize) -> Option<usize> {
    let total = options.len() as isize;
    (0..total)
        .map(|step| (target as isize + step * direction).rem_euclid(total) as usize)
        .find(|&i| options[i].is_selectable() && options[i].is_visible_for(player))
}

/// Reject options that cannot work once added.
pub(crate) fn check_option(option: &MenuOption) -> Result<(), MenuError> {
    if let OptionKind::Choice(state) = option.kind() {
        if state.choices().is_empty() {
            return Err(MenuError::EmptyChoices {
                option: option.label_for(PlayerId(0)),
            });
        }
    }
    Ok(())
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("title", &self.config.title)
            .field("options", &self.options.len())
            .field("open_players", &self.states.read().len())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
