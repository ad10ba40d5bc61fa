#![forbid(unsafe_code)]

//! Ordered, shared option list of a menu.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hudmenu_core::PlayerId;
use parking_lot::{Mutex, MutexGuard};

use crate::option::{MenuOption, OptionId};

/// Options in display order.
///
/// Mutation bumps a revision counter so per-player render caches can tell
/// they are stale without holding the list lock.
#[derive(Debug, Default)]
pub struct MenuOptionSet {
    options: Mutex<Vec<Arc<MenuOption>>>,
    revision: AtomicU64,
}

impl MenuOptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `option`; returns its index.
    pub fn push(&self, option: Arc<MenuOption>) -> usize {
        let mut options = self.options.lock();
        options.push(option);
        self.revision.fetch_add(1, Ordering::AcqRel);
        options.len() - 1
    }

    /// Remove the option with `id`; returns the index it held.
    pub fn remove(&self, id: OptionId) -> Option<usize> {
        let mut options = self.options.lock();
        let index = options.iter().position(|o| o.id() == id)?;
        options.remove(index);
        self.revision.fetch_add(1, Ordering::AcqRel);
        Some(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.lock().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Arc<MenuOption>> {
        self.options.lock().get(index).cloned()
    }

    #[must_use]
    pub fn position(&self, id: OptionId) -> Option<usize> {
        self.options.lock().iter().position(|o| o.id() == id)
    }

    /// Clone of the current list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<MenuOption>> {
        self.options.lock().clone()
    }

    /// Run `f` with the list locked.
    pub fn with<R>(&self, f: impl FnOnce(&[Arc<MenuOption>]) -> R) -> R {
        f(&self.options.lock())
    }

    /// Hold the list lock across a compound update.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Arc<MenuOption>>> {
        self.options.lock()
    }

    pub(crate) fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Indices of options `player` can see, in order.
    ///
    /// Predicates run against a snapshot, so they may read this set.
    #[must_use]
    pub fn visible_indices(&self, player: PlayerId) -> Vec<usize> {
        self.snapshot()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_visible_for(player))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_remove_track_revision() {
        let set = MenuOptionSet::new();
        let a = Arc::new(MenuOption::text("a"));
        let b = Arc::new(MenuOption::text("b"));
        let b_id = b.id();
        assert_eq!(set.push(a), 0);
        assert_eq!(set.push(b), 1);
        assert_eq!(set.revision(), 2);
        assert_eq!(set.remove(b_id), Some(1));
        assert_eq!(set.remove(b_id), None);
        assert_eq!(set.revision(), 3);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn visible_indices_skip_hidden() {
        let set = MenuOptionSet::new();
        set.push(Arc::new(MenuOption::text("a")));
        set.push(Arc::new(MenuOption::text("b").visible(false)));
        set.push(Arc::new(MenuOption::text("c").visible_when(|p| p.get() == 1)));
        assert_eq!(set.visible_indices(PlayerId(1)), vec![0, 2]);
        assert_eq!(set.visible_indices(PlayerId(2)), vec![0]);
    }

    #[test]
    fn visibility_predicate_may_read_the_set() {
        let set = Arc::new(MenuOptionSet::new());
        let weak = Arc::downgrade(&set);
        set.push(Arc::new(MenuOption::text("always")));
        let crowded =
            MenuOption::text("crowded").visible_when(move |_| weak.upgrade().is_some_and(|s| s.len() > 2));
        set.push(Arc::new(crowded));
        assert_eq!(set.visible_indices(PlayerId(1)), vec![0]);
        set.push(Arc::new(MenuOption::text("third")));
        assert_eq!(set.visible_indices(PlayerId(1)), vec![0, 1, 2]);
        assert_eq!(set.snapshot().len(), 3);
    }
}
