#![forbid(unsafe_code)]

//! Approximate glyph widths for the HUD font.
//!
//! The HUD renders a proportional font, so widths are fractional units
//! roughly equal to one lowercase Latin letter. CJK, kana and Hangul get
//! their own factors; other code points fall back to their Unicode cell
//! width.
//!
//! ```
//! use hudmenu_text::metrics::{char_width, estimate_width};
//!
//! assert_eq!(char_width('a'), 1.0);
//! assert_eq!(char_width('A'), 1.2);
//! assert_eq!(estimate_width("Hi!"), 1.2 + 1.0 + 0.8);
//! ```

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;
use unicode_width::UnicodeWidthChar;

/// Default capacity of [`WidthCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Width of a single character in HUD units.
#[must_use]
pub fn char_width(ch: char) -> f32 {
    match ch {
        '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}' => 2.0,
        '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' => 2.2,
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => 2.05,
        'A'..='Z' => 1.2,
        'a'..='z' | '0'..='9' => 1.0,
        ' ' => 0.5,
        '!'..='/' | ':'..='@' | '['..='`' | '{'..='~' => 0.8,
        _ => match ch.width() {
            None | Some(0) => 0.0,
            Some(1) => 1.0,
            Some(_) => 2.0,
        },
    }
}

/// Sum of [`char_width`] over `plain`. Tags are not stripped here.
#[must_use]
pub fn estimate_width(plain: &str) -> f32 {
    plain.chars().map(char_width).sum()
}

/// How many leading characters fit into `max_width`.
///
/// Greedy: stops at the first character that would overflow, even if a
/// narrower one follows.
#[must_use]
pub fn fit_char_count<I>(chars: I, max_width: f32) -> usize
where
    I: IntoIterator<Item = char>,
{
    let mut used = 0.0f32;
    let mut count = 0;
    for ch in chars {
        let w = char_width(ch);
        if used + w > max_width {
            break;
        }
        used += w;
        count += 1;
    }
    count
}

/// Hit/miss counters for [`WidthCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of [`estimate_width`] results.
///
/// Option labels are re-measured on every render pass; most of them never
/// change. Keys are FxHash fingerprints of the text, not the text itself.
#[derive(Debug)]
pub struct WidthCache {
    cache: LruCache<u64, f32>,
    hits: u64,
    misses: u64,
}

impl WidthCache {
    /// Capacity zero is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_compute(&mut self, plain: &str) -> f32 {
        let key = fingerprint(plain);
        if let Some(&width) = self.cache.get(&key) {
            self.hits += 1;
            return width;
        }
        self.misses += 1;
        let width = estimate_width(plain);
        self.cache.put(key, width);
        width
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }
}

impl Default for WidthCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// FxHash fingerprint of a string.
#[inline]
#[must_use]
pub fn fingerprint(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
