#![forbid(unsafe_code)]

//! Per-player cursor and render cache for one open menu.

use hudmenu_core::TimerHandle;
use hudmenu_text::TextEffectEngine;

/// Cursor, cached markup and auto-close timer of one player in one menu.
///
/// `desired_index` is the only value navigation writes. `selected_index`
/// is what the last render resolved it to after hiding options the
/// player cannot see.
///
/// The text effect engine is lent out for the length of a render pass so
/// option callbacks run with this state unlocked.
#[derive(Debug)]
pub struct PlayerMenuState {
    desired_index: usize,
    selected_index: usize,
    render_cache: Option<String>,
    auto_close: Option<TimerHandle>,
    effects: Option<TextEffectEngine>,
}

impl PlayerMenuState {
    #[must_use]
    pub fn new(auto_close: Option<TimerHandle>) -> Self {
        Self {
            desired_index: 0,
            selected_index: 0,
            render_cache: None,
            auto_close,
            effects: Some(TextEffectEngine::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn desired_index(&self) -> usize {
        self.desired_index
    }

    /// Move the cursor; drops the cached markup if it changed.
    pub fn set_desired_index(&mut self, index: usize) -> bool {
        if self.desired_index == index {
            return false;
        }
        self.desired_index = index;
        self.invalidate();
        true
    }

    #[inline]
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub(crate) fn set_selected_index(&mut self, index: usize) {
        self.selected_index = index;
    }

    #[must_use]
    pub fn render_cache(&self) -> Option<&str> {
        self.render_cache.as_deref()
    }

    pub(crate) fn store_render(&mut self, markup: String) {
        self.render_cache = Some(markup);
    }

    /// Force the next flush to re-render.
    pub fn invalidate(&mut self) {
        self.render_cache = None;
    }

    #[must_use]
    pub fn auto_close(&self) -> Option<&TimerHandle> {
        self.auto_close.as_ref()
    }

    /// Cancel and drop the auto-close timer, if any.
    pub fn cancel_auto_close(&mut self) {
        if let Some(timer) = self.auto_close.take() {
            timer.cancel();
        }
    }

    /// `None` while a render pass holds the engine.
    pub(crate) fn effects_mut(&mut self) -> Option<&mut TextEffectEngine> {
        self.effects.as_mut()
    }

    /// Borrow the engine for one render pass. `None` if another pass
    /// already has it.
    pub(crate) fn take_effects(&mut self) -> Option<TextEffectEngine> {
        self.effects.take()
    }

    pub(crate) fn restore_effects(&mut self, engine: TextEffectEngine) {
        self.effects = Some(engine);
    }

    /// Keep the cursor on the same option after the option at `removed`
    /// left a list that now has `remaining` entries.
    pub fn option_removed(&mut self, removed: usize, remaining: usize) {
        if removed < self.desired_index {
            self.desired_index -= 1;
        }
        self.desired_index = self.desired_index.min(remaining.saturating_sub(1));
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_cursor_drops_cache() {
        let mut state = PlayerMenuState::new(None);
        state.store_render("x".into());
        assert!(!state.set_desired_index(0));
        assert_eq!(state.render_cache(), Some("x"));
        assert!(state.set_desired_index(2));
        assert_eq!(state.render_cache(), None);
    }

    #[test]
    fn removal_before_cursor_shifts_it() {
        let mut state = PlayerMenuState::new(None);
        state.set_desired_index(3);
        state.option_removed(1, 4);
        assert_eq!(state.desired_index(), 2);
        state.option_removed(2, 2);
        assert_eq!(state.desired_index(), 1);
        state.option_removed(0, 0);
        assert_eq!(state.desired_index(), 0);
    }

    #[test]
    fn effects_are_lent_to_one_pass_at_a_time() {
        let mut state = PlayerMenuState::new(None);
        let engine = state.take_effects();
        assert!(engine.is_some());
        assert!(state.take_effects().is_none());
        assert!(state.effects_mut().is_none());
        state.restore_effects(engine.unwrap());
        assert!(state.effects_mut().is_some());
    }

    #[test]
    fn cancel_auto_close_cancels_handle() {
        let timer = TimerHandle::new();
        let mut state = PlayerMenuState::new(Some(timer.clone()));
        state.cancel_auto_close();
        assert!(timer.is_cancelled());
        assert!(state.auto_close().is_none());
    }
}
