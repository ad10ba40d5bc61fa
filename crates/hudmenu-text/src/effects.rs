#![forbid(unsafe_code)]

//! Overflow handling for option labels wider than their budget.
//!
//! Every function here keeps its output tag-balanced: tags that were open
//! at the first emitted character are reopened, tags still open at the
//! end are closed in reverse order, and a label that already fits is
//! returned unchanged.
//!
//! | Style               | Output                                                |
//! |---------------------|-------------------------------------------------------|
//! | `TruncateEnd`       | leading characters + `...`                            |
//! | `TruncateBothEnds`  | the middle of the label                               |
//! | `ScrollFade(dir)`   | a window sliding off one edge, then a blank frame     |
//! | `ScrollLoop(dir)`   | a window over the label treated as a ring             |

use std::borrow::Cow;

use crate::markup::{self, Segment, TagStack, strip_tags};
use crate::metrics::{self, WidthCache, estimate_width, fit_char_count};
use crate::scroll_clock::{ScrollClock, ScrollDirection, ScrollKey, ScrollTiming};

/// Suffix appended by [`truncate_end`] through the engine.
pub const DEFAULT_SUFFIX: &str = "...";

/// How to fit a label into its width budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowStyle {
    TruncateEnd,
    TruncateBothEnds,
    ScrollFade(ScrollDirection),
    ScrollLoop(ScrollDirection),
}

/// Width budget plus overflow behaviour for one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalStyle {
    pub max_width: f32,
    pub overflow: OverflowStyle,
    pub timing: ScrollTiming,
}

impl HorizontalStyle {
    #[must_use]
    pub fn new(overflow: OverflowStyle, max_width: f32) -> Self {
        Self {
            max_width,
            overflow,
            timing: ScrollTiming::default(),
        }
    }

    #[must_use]
    pub fn ticks_per_scroll(mut self, ticks: u32) -> Self {
        self.timing.ticks_per_scroll = ticks;
        self
    }

    #[must_use]
    pub fn pause_ticks(mut self, ticks: u32) -> Self {
        self.timing.pause_ticks = ticks;
        self
    }
}

fn fits(text: &str, max_width: f32) -> bool {
    estimate_width(&strip_tags(text)) <= max_width
}

/// Keep as many leading characters as fit next to `suffix`.
///
/// Open tags are closed before the suffix. If the suffix alone does not
/// fit, the suffix is returned.
#[must_use]
pub fn truncate_end(text: &str, max_width: f32, suffix: &str) -> String {
    if fits(text, max_width) {
        return text.to_owned();
    }
    let budget = max_width - estimate_width(suffix);
    if budget <= 0.0 {
        return suffix.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut stack = TagStack::new();
    let mut used = 0.0f32;
    let mut reached = false;
    'segments: for segment in markup::parse(text) {
        match segment {
            Segment::Tag(tag) => stack.emit(&tag, &mut out),
            Segment::Text(run) => {
                for ch in run.chars() {
                    let w = metrics::char_width(ch);
                    if used + w > budget {
                        reached = true;
                        break 'segments;
                    }
                    out.push(ch);
                    used += w;
                }
            }
        }
    }
    stack.close_all(&mut out);
    if reached {
        out.push_str(suffix);
    }
    out
}

/// Characters `start..end` of the plain text, with the tags active there.
fn render_window(segments: &[Segment<'_>], start: usize, end: usize) -> String {
    let mut out = String::new();
    let mut active = TagStack::new();
    let mut emitted: Option<TagStack<'_>> = None;
    let mut index = 0usize;

    for segment in segments {
        match segment {
            Segment::Tag(tag) => match emitted.as_mut() {
                None => active.apply(tag),
                Some(stack) if index < end => stack.emit(tag, &mut out),
                Some(_) => {}
            },
            Segment::Text(run) => {
                for ch in run.chars() {
                    if (start..end).contains(&index) {
                        if emitted.is_none() {
                            active.open_all(&mut out);
                            emitted = Some(active.clone());
                        }
                        out.push(ch);
                    }
                    index += 1;
                }
            }
        }
    }
    if let Some(mut stack) = emitted {
        stack.close_all(&mut out);
    }
    out
}

/// Parsed label plus how many of its characters fit.
struct Prepared<'a> {
    segments: Vec<Segment<'a>>,
    chars: Vec<char>,
    target: usize,
}

fn prepare(text: &str, max_width: f32) -> Option<Prepared<'_>> {
    if fits(text, max_width) {
        return None;
    }
    let segments = markup::parse(text);
    let chars = markup::plain_chars(&segments);
    if chars.is_empty() {
        return None;
    }
    let target = fit_char_count(chars.iter().copied(), max_width);
    Some(Prepared {
        segments,
        chars,
        target,
    })
}

/// Keep the middle of the label, dropping an equal share from each end.
///
/// When the split is uneven the extra character is dropped from the end.
#[must_use]
pub fn truncate_both_ends(text: &str, max_width: f32) -> String {
    let Some(p) = prepare(text, max_width) else {
        return text.to_owned();
    };
    if p.target == 0 {
        return String::new();
    }
    let skip_start = (p.chars.len() - p.target) / 2;
    render_window(&p.segments, skip_start, skip_start + p.target)
}

/// A window that slides off one edge.
///
/// `offset` runs over `0..=len`; at `len` the window is empty.
#[must_use]
pub fn scroll_fade(text: &str, max_width: f32, direction: ScrollDirection, offset: usize) -> String {
    let Some(p) = prepare(text, max_width) else {
        return text.to_owned();
    };
    if p.target == 0 {
        return String::new();
    }
    let len = p.chars.len();
    let offset = offset.min(len);
    let (start, end) = match direction {
        ScrollDirection::Left => (offset, (offset + p.target).min(len)),
        ScrollDirection::Right => (len.saturating_sub(p.target + offset), len - offset),
    };
    render_window(&p.segments, start, end)
}

/// A window over the label treated as a ring.
///
/// Tag state is tracked per character, and only the tags that differ
/// between neighbouring emitted characters are closed and reopened.
#[must_use]
pub fn scroll_loop(text: &str, max_width: f32, direction: ScrollDirection, offset: usize) -> String {
    let Some(p) = prepare(text, max_width) else {
        return text.to_owned();
    };
    if p.target == 0 {
        return String::new();
    }
    let len = p.chars.len();
    let offset = offset % len;

    let mut states: Vec<TagStack<'_>> = vec![TagStack::new()];
    let mut state_of: Vec<usize> = Vec::with_capacity(len);
    for segment in &p.segments {
        match segment {
            Segment::Tag(tag) => {
                let mut next = states[states.len() - 1].clone();
                next.apply(tag);
                states.push(next);
            }
            Segment::Text(run) => {
                let current = states.len() - 1;
                state_of.extend(run.chars().map(|_| current));
            }
        }
    }

    let mut out = String::new();
    let mut stack = TagStack::new();
    for i in 0..p.target {
        let index = match direction {
            ScrollDirection::Left => (offset + i) % len,
            ScrollDirection::Right => (len - offset + i) % len,
        };
        stack.transition_to(states[state_of[index]].entries(), &mut out);
        out.push(p.chars[index]);
    }
    stack.close_all(&mut out);
    out
}

/// Add the one-space seam a looping label scrolls through.
#[must_use]
pub fn loop_padded(text: &str, direction: ScrollDirection) -> String {
    match direction {
        ScrollDirection::Left => format!("{} ", text.trim_end()),
        ScrollDirection::Right => format!(" {}", text.trim_start()),
    }
}

/// Applies [`HorizontalStyle`]s and owns the scroll offsets they need.
///
/// One engine belongs to one player's open menu; resetting it restarts
/// every animation.
#[derive(Debug, Default)]
pub struct TextEffectEngine {
    clock: ScrollClock,
    widths: WidthCache,
}

impl TextEffectEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit `text` into `style`.
    ///
    /// `slot` identifies the label for scroll bookkeeping. Only a caller
    /// passing `advance = true` moves scrolling labels forward.
    pub fn apply<'t>(
        &mut self,
        slot: u64,
        text: &'t str,
        style: &HorizontalStyle,
        advance: bool,
    ) -> Cow<'t, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }
        let plain = strip_tags(text);
        if self.widths.get_or_compute(&plain) <= style.max_width {
            return Cow::Borrowed(text);
        }
        let rendered = match style.overflow {
            OverflowStyle::TruncateEnd => truncate_end(text, style.max_width, DEFAULT_SUFFIX),
            OverflowStyle::TruncateBothEnds => truncate_both_ends(text, style.max_width),
            OverflowStyle::ScrollFade(direction) => {
                let wrap = plain.chars().count() + 1;
                let offset = self.tick(slot, direction, &plain, wrap, style, advance);
                scroll_fade(text, style.max_width, direction, offset)
            }
            OverflowStyle::ScrollLoop(direction) => {
                let padded = loop_padded(text, direction);
                let padded_plain = strip_tags(&padded);
                let wrap = padded_plain.chars().count();
                let offset = self.tick(slot, direction, &padded_plain, wrap, style, advance);
                scroll_loop(&padded, style.max_width, direction, offset)
            }
        };
        Cow::Owned(rendered)
    }

    fn tick(
        &mut self,
        slot: u64,
        direction: ScrollDirection,
        plain: &str,
        wrap: usize,
        style: &HorizontalStyle,
        advance: bool,
    ) -> usize {
        let key = ScrollKey { slot, direction };
        self.clock
            .offset(key, metrics::fingerprint(plain), wrap, style.timing, advance)
    }

    /// Restart every scrolling label.
    pub fn reset(&mut self) {
        self.clock.reset();
    }

    /// Drop scroll state for one label slot.
    pub fn forget(&mut self, slot: u64) {
        self.clock.forget(slot);
    }

    #[must_use]
    pub fn width_stats(&self) -> metrics::CacheStats {
        self.widths.stats()
    }
}
