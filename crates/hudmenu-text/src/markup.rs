#![forbid(unsafe_code)]

//! Inline HUD markup: `<font ...>`, `<b>`, `<i>`, `<br>` and friends.
//!
//! The parser is deliberately shallow. A tag is anything from `<` to the
//! next `>`; there is no entity decoding and no attribute model. What it
//! does guarantee is stack discipline: [`TagStack::emit`] never writes a
//! closing tag that would leave the output mis-nested, even when the
//! source closes tags out of order.
//!
//! # Example
//! ```
//! use hudmenu_text::markup::{is_balanced, strip_tags};
//!
//! let text = "<font color='#FF0000'>Red</font> and <b>bold</b>";
//! assert_eq!(strip_tags(text), "Red and bold");
//! assert!(is_balanced(text));
//! ```

use std::borrow::Cow;

use smallvec::SmallVec;

/// Syntactic class of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>`
    Open,
    /// `</name>`
    Close,
    /// `<name .../>`, `<!...>`, and void tags such as `<br>`.
    SelfClosing,
}

/// One `<...>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Full source text including the angle brackets.
    pub raw: &'a str,
    /// Tag name as written (first token after `<` or `</`).
    pub name: &'a str,
    pub kind: TagKind,
}

impl<'a> Tag<'a> {
    /// Classify a raw `<...>` token.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let inner = raw
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(raw);

        let (kind, body) = if let Some(rest) = inner.strip_prefix('/') {
            (TagKind::Close, rest)
        } else if inner.starts_with('!') {
            (TagKind::SelfClosing, inner)
        } else if let Some(rest) = inner.strip_suffix('/') {
            (TagKind::SelfClosing, rest)
        } else {
            (TagKind::Open, inner)
        };

        let name = body
            .split_ascii_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches('/');

        let kind = if name.is_empty() || is_void(name) {
            TagKind::SelfClosing
        } else {
            kind
        };
        Self { raw, name, kind }
    }

    #[inline]
    fn same_name(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

fn is_void(name: &str) -> bool {
    name.eq_ignore_ascii_case("br") || name.eq_ignore_ascii_case("hr")
}

/// A run of plain text or a single tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

/// Split `text` into plain runs and tags, in source order.
///
/// A `<` with no later `>` is plain text.
#[must_use]
pub fn parse(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open..].find('>') else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        let end = open + len + 1;
        segments.push(Segment::Tag(Tag::parse(&rest[open..end])));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

/// Plain text with every tag removed.
#[must_use]
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    if !text.contains('<') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for segment in parse(text) {
        if let Segment::Text(run) = segment {
            out.push_str(run);
        }
    }
    Cow::Owned(out)
}

/// Plain characters of already-parsed segments.
#[must_use]
pub fn plain_chars(segments: &[Segment<'_>]) -> Vec<char> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Text(run) => Some(run.chars()),
            Segment::Tag(_) => None,
        })
        .flatten()
        .collect()
}

/// Whether every opening tag is closed in LIFO order.
#[must_use]
pub fn is_balanced(text: &str) -> bool {
    let mut stack: SmallVec<[&str; 8]> = SmallVec::new();
    for segment in parse(text) {
        let Segment::Tag(tag) = segment else {
            continue;
        };
        match tag.kind {
            TagKind::Open => stack.push(tag.name),
            TagKind::Close => match stack.pop() {
                Some(top) if tag.same_name(top) => {}
                _ => return false,
            },
            TagKind::SelfClosing => {}
        }
    }
    stack.is_empty()
}

/// Split on line-break tags (`<br>`, `<br/>`, `</br>`, `<\br>`).
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut cursor = 0;
    while let Some(open) = text[cursor..].find('<') {
        let open = cursor + open;
        let Some(len) = text[open..].find('>') else {
            break;
        };
        let end = open + len + 1;
        let inner = text[open + 1..end - 1].trim_matches(|c| c == '/' || c == '\\');
        if inner.eq_ignore_ascii_case("br") {
            lines.push(&text[start..open]);
            start = end;
        }
        cursor = end;
    }
    lines.push(&text[start..]);
    lines
}

/// Remove ` color='#RRGGBB'` attributes (either quote style).
#[must_use]
pub fn strip_color_attributes(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            if let Some(end) = match_color_attribute(bytes, i) {
                let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
                buf.push_str(&text[copied..i]);
                copied = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(text),
    }
}

/// End offset of a color attribute starting at whitespace `start`.
fn match_color_attribute(bytes: &[u8], start: usize) -> Option<usize> {
    let skip_ws = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };
    let mut i = start + 1;
    let keyword = bytes.get(i..i + 5)?;
    if !keyword.eq_ignore_ascii_case(b"color") {
        return None;
    }
    i = skip_ws(i + 5);
    if bytes.get(i) != Some(&b'=') {
        return None;
    }
    i = skip_ws(i + 1);
    if !matches!(bytes.get(i), Some(b'\'' | b'"')) || bytes.get(i + 1) != Some(&b'#') {
        return None;
    }
    i += 2;
    let hex = bytes.get(i..i + 6)?;
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    i += 6;
    matches!(bytes.get(i), Some(b'\'' | b'"')).then_some(i + 1)
}

/// An open tag remembered by name and source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTag<'a> {
    pub name: &'a str,
    pub raw: &'a str,
}

/// Stack of currently open tags.
///
/// Use [`apply`](Self::apply) to track what the *source* has open, and
/// [`emit`](Self::emit) to write tags into an output buffer while keeping
/// the output well nested.
#[derive(Debug, Clone, Default)]
pub struct TagStack<'a> {
    entries: SmallVec<[OpenTag<'a>; 8]>,
}

impl<'a> TagStack<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[OpenTag<'a>] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn last_named(&self, tag: &Tag<'_>) -> Option<usize> {
        self.entries.iter().rposition(|e| tag.same_name(e.name))
    }

    /// Update the stack without writing anything.
    ///
    /// A close removes the most recent same-named entry, wherever it sits.
    pub fn apply(&mut self, tag: &Tag<'a>) {
        match tag.kind {
            TagKind::Open => self.entries.push(OpenTag {
                name: tag.name,
                raw: tag.raw,
            }),
            TagKind::Close => {
                if let Some(idx) = self.last_named(tag) {
                    self.entries.remove(idx);
                }
            }
            TagKind::SelfClosing => {}
        }
    }

    /// Write `tag` to `out` and update the stack.
    ///
    /// Stray closes are dropped. A close that matches an entry below the
    /// top closes the entries above it first and reopens them afterwards.
    pub fn emit(&mut self, tag: &Tag<'a>, out: &mut String) {
        match tag.kind {
            TagKind::Open => {
                out.push_str(tag.raw);
                self.apply(tag);
            }
            TagKind::SelfClosing => out.push_str(tag.raw),
            TagKind::Close => {
                let Some(idx) = self.last_named(tag) else {
                    return;
                };
                for above in self.entries[idx..].iter().rev() {
                    push_close(out, above.name);
                }
                self.entries.remove(idx);
                for above in &self.entries[idx..] {
                    out.push_str(above.raw);
                }
            }
        }
    }

    /// Write the opening text of every entry, bottom first.
    pub fn open_all(&self, out: &mut String) {
        for entry in &self.entries {
            out.push_str(entry.raw);
        }
    }

    /// Close every entry, top first, and empty the stack.
    pub fn close_all(&mut self, out: &mut String) {
        for entry in self.entries.drain(..).rev() {
            push_close(out, entry.name);
        }
    }

    /// Make the stack equal to `target`, writing the minimal close/open
    /// sequence that keeps the shared bottom of both stacks open.
    pub fn transition_to(&mut self, target: &[OpenTag<'a>], out: &mut String) {
        let shared = self
            .entries
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();
        for entry in self.entries[shared..].iter().rev() {
            push_close(out, entry.name);
        }
        self.entries.truncate(shared);
        for entry in &target[shared..] {
            out.push_str(entry.raw);
            self.entries.push(*entry);
        }
    }
}

fn push_close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
