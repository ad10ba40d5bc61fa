#![forbid(unsafe_code)]

//! Text handling for HUD menus.
//!
//! - [`metrics`] estimates label widths in HUD font units.
//! - [`markup`] splits inline tags from text and keeps tag stacks balanced.
//! - [`scroll_clock`] holds per-label scroll offsets.
//! - [`effects`] truncates, fades or loops labels that overflow.
//!
//! # Example
//! ```
//! use hudmenu_text::{HorizontalStyle, OverflowStyle, TextEffectEngine};
//!
//! let mut engine = TextEffectEngine::new();
//! let style = HorizontalStyle::new(OverflowStyle::TruncateEnd, 6.0);
//! assert_eq!(engine.apply(0, "<b>Hello</b> World", &style, false), "<b>Hel</b>...");
//! ```

pub mod effects;
pub mod markup;
pub mod metrics;
pub mod scroll_clock;

pub use effects::{
    DEFAULT_SUFFIX, HorizontalStyle, OverflowStyle, TextEffectEngine, loop_padded, scroll_fade,
    scroll_loop, truncate_both_ends, truncate_end,
};
pub use markup::{Segment, Tag, TagKind, TagStack, is_balanced, split_lines, strip_tags};
pub use metrics::{WidthCache, char_width, estimate_width, fit_char_count};
pub use scroll_clock::{ScrollClock, ScrollDirection, ScrollKey, ScrollTiming};
