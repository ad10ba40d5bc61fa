#![forbid(unsafe_code)]

//! Tick-driven offsets for scrolling text.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

/// Which way scrolling text travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollDirection {
    #[default]
    Left,
    Right,
}

/// Identity of one scrolling label: the option slot plus direction.
///
/// Keying by slot rather than by text keeps two options with identical
/// labels from sharing an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollKey {
    pub slot: u64,
    pub direction: ScrollDirection,
}

/// Timing parameters for one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTiming {
    /// Advances per one-character step. Values below one act as one.
    pub ticks_per_scroll: u32,
    /// Advances to hold after the offset wraps back to zero.
    pub pause_ticks: u32,
}

impl Default for ScrollTiming {
    fn default() -> Self {
        Self {
            ticks_per_scroll: 16,
            pause_ticks: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ScrollEntry {
    fingerprint: u64,
    offset: usize,
    calls: u32,
    pause: u32,
}

/// Per-label scroll offsets.
///
/// An entry restarts from zero whenever the fingerprint of its text
/// changes, so dynamic labels never inherit a stale offset.
#[derive(Debug, Default)]
pub struct ScrollClock {
    entries: FxHashMap<ScrollKey, ScrollEntry>,
}

impl ScrollClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset to draw for `key` this frame, in `0..wrap`.
    ///
    /// An advancing call returns the current offset and then steps the
    /// clock, so the first frame of a label is always drawn at zero. When
    /// `advance` is false the offset is only read. A zero `wrap` always
    /// yields zero.
    pub fn offset(
        &mut self,
        key: ScrollKey,
        fingerprint: u64,
        wrap: usize,
        timing: ScrollTiming,
        advance: bool,
    ) -> usize {
        if wrap == 0 {
            return 0;
        }
        let fresh = ScrollEntry {
            fingerprint,
            ..ScrollEntry::default()
        };
        let entry = match self.entries.entry(key) {
            Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                if entry.fingerprint != fingerprint {
                    tracing::debug!(slot = key.slot, "scrolling label changed, restarting");
                    *entry = fresh;
                }
                entry
            }
            Entry::Vacant(vacant) => vacant.insert(fresh),
        };
        if !advance {
            return entry.offset % wrap;
        }
        let shown = entry.offset % wrap;
        if entry.pause > 0 {
            entry.pause -= 1;
            return shown;
        }
        entry.calls += 1;
        if entry.calls >= timing.ticks_per_scroll.max(1) {
            entry.calls = 0;
            entry.offset = (shown + 1) % wrap;
            if entry.offset == 0 && timing.pause_ticks > 0 {
                tracing::trace!(slot = key.slot, pause = timing.pause_ticks, "scroll cycle complete");
                entry.pause = timing.pause_ticks;
            }
        }
        shown
    }

    /// Forget every offset.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Forget offsets belonging to one slot.
    pub fn forget(&mut self, slot: u64) {
        self.entries.retain(|key, _| key.slot != slot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
