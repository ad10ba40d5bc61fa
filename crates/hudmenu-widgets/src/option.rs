#![forbid(unsafe_code)]

//! Menu options.
//!
//! A [`MenuOption`] carries the attributes every option shares (label,
//! visibility, enablement, size, overflow style, validation) and an
//! [`OptionKind`] with the variant payload. Per-player values such as a
//! toggle's state live inside the payload behind a mutex, so one option
//! value can be shown to many players at once.
//!
//! Options are built with chained setters and handed to a menu, which
//! wraps them in an `Arc`:
//!
//! ```
//! use hudmenu_widgets::{MenuOption, TextSize};
//!
//! let opt = MenuOption::toggle("God mode", false)
//!     .text_size(TextSize::Small)
//!     .close_after_select(false);
//! assert!(opt.is_selectable());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use hudmenu_core::PlayerId;
use hudmenu_text::markup::strip_color_attributes;
use hudmenu_text::{HorizontalStyle, TextEffectEngine};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::menu::Menu;

static NEXT_OPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId(u64);

impl OptionId {
    fn next() -> Self {
        Self(NEXT_OPTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option#{}", self.0)
    }
}

/// Font size class of an option row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    Small,
    SmallMedium,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl TextSize {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Small => "fontSize-s",
            Self::SmallMedium => "fontSize-sm",
            Self::Medium => "fontSize-m",
            Self::Large => "fontSize-l",
            Self::ExtraLarge => "fontSize-xl",
        }
    }
}

/// Horizontal alignment of a text row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

pub type PlayerPredicate = Arc<dyn Fn(PlayerId) -> bool + Send + Sync>;
pub type PlayerCallback = Arc<dyn Fn(PlayerId) + Send + Sync>;
pub type TextProvider = Arc<dyn Fn(PlayerId) -> String + Send + Sync>;
pub type ProgressProvider = Arc<dyn Fn(PlayerId) -> f32 + Send + Sync>;
pub type ValueHandler<T> = Arc<dyn Fn(PlayerId, T) + Send + Sync>;
/// Replaces the label before formatting when it returns `Some`.
pub type BeforeFormat = Arc<dyn Fn(PlayerId, &str) -> Option<String> + Send + Sync>;
/// Rewrites the finished row markup.
pub type AfterFormat = Arc<dyn Fn(PlayerId, String) -> String + Send + Sync>;
pub type SubmenuFactory = Arc<dyn Fn(PlayerId) -> Arc<Menu> + Send + Sync>;

const TOGGLE_ON: &str = "<font color='#008000'>✔</font>";
const TOGGLE_OFF: &str = "<font color='#FF0000'>✘</font>";
const CLOSE_ACCENT: &str = "#FF3333";
const EMPTY_BAR_COLOR: &str = "#666666";
const LOADING_COLOR: &str = "#ffaa00";
const SEPARATOR_RULE: &str = "─────────────────────";
const SLIDER_BARS: usize = 10;

/// Label source.
#[derive(Clone)]
pub enum OptionText {
    Static(String),
    Dynamic(TextProvider),
}

impl OptionText {
    fn resolve(&self, player: PlayerId) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(provider) => provider(player),
        }
    }
}

/// On/off switch, on by default.
pub struct ToggleState {
    default: bool,
    values: Mutex<FxHashMap<PlayerId, bool>>,
    on_change: Option<ValueHandler<bool>>,
}

impl ToggleState {
    #[must_use]
    pub fn value(&self, player: PlayerId) -> bool {
        self.values.lock().get(&player).copied().unwrap_or(self.default)
    }

    pub fn set(&self, player: PlayerId, value: bool) {
        self.values.lock().insert(player, value);
    }

    fn flip(&self, player: PlayerId) -> bool {
        let mut values = self.values.lock();
        let value = !values.get(&player).copied().unwrap_or(self.default);
        values.insert(player, value);
        value
    }

    fn forget(&self, player: PlayerId) {
        self.values.lock().remove(&player);
    }
}

/// Numeric value in `min..=max` moved by `step`.
pub struct SliderState {
    min: f32,
    max: f32,
    step: f32,
    default: f32,
    values: Mutex<FxHashMap<PlayerId, f32>>,
    on_change: Option<ValueHandler<f32>>,
}

impl SliderState {
    fn new(min: f32, max: f32, default: f32, step: f32) -> Self {
        let [min, max] = [("min", min), ("max", max)].map(|(bound, value)| {
            if value.is_nan() {
                tracing::warn!(bound, "slider bound is NaN, reading as zero");
                0.0
            } else {
                value
            }
        });
        let (min, max) = if min <= max { (min, max) } else {
            tracing::warn!(min, max, "slider bounds reversed, swapping");
            (max, min)
        };
        let span = max - min;
        let step = if step > 0.0 && (span == 0.0 || step <= span) {
            step
        } else {
            let clamped = if span > 0.0 { span / SLIDER_BARS as f32 } else { 1.0 };
            tracing::warn!(step, clamped, "slider step out of range, clamping");
            clamped
        };
        Self {
            min,
            max,
            step,
            default: if default.is_nan() { min } else { default.clamp(min, max) },
            values: Mutex::new(FxHashMap::default()),
            on_change: None,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    #[must_use]
    pub fn value(&self, player: PlayerId) -> f32 {
        self.values.lock().get(&player).copied().unwrap_or(self.default)
    }

    /// Store `value` clamped into bounds and return what was stored.
    pub fn set(&self, player: PlayerId, value: f32) -> f32 {
        let value = value.clamp(self.min, self.max);
        self.values.lock().insert(player, value);
        value
    }

    /// Move up one step, stopping at `max`.
    pub fn increase(&self, player: PlayerId) -> f32 {
        self.set(player, self.value(player) + self.step)
    }

    /// Move down one step, stopping at `min`.
    pub fn decrease(&self, player: PlayerId) -> f32 {
        self.set(player, self.value(player) - self.step)
    }

    /// Select behaviour: one step up, wrapping past `max` back to `min`.
    fn advance(&self, player: PlayerId) -> f32 {
        let next = self.value(player) + self.step;
        if next > self.max + f32::EPSILON * self.max.abs().max(1.0) {
            self.set(player, self.min)
        } else {
            self.set(player, next)
        }
    }

    fn filled_bars(&self, value: f32) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 {
            return SLIDER_BARS;
        }
        let ratio = ((value - self.min) / span).clamp(0.0, 1.0);
        ((ratio * SLIDER_BARS as f32) as usize).min(SLIDER_BARS)
    }

    fn forget(&self, player: PlayerId) {
        self.values.lock().remove(&player);
    }
}

/// One of a fixed list of strings.
pub struct ChoiceState {
    choices: Vec<String>,
    default_index: usize,
    indices: Mutex<FxHashMap<PlayerId, usize>>,
    on_change: Option<ValueHandler<usize>>,
}

impl ChoiceState {
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn index(&self, player: PlayerId) -> usize {
        self.indices.lock().get(&player).copied().unwrap_or(self.default_index)
    }

    #[must_use]
    pub fn selected(&self, player: PlayerId) -> Option<&str> {
        self.choices.get(self.index(player)).map(String::as_str)
    }

    /// Select `index`, clamped into range.
    pub fn set_index(&self, player: PlayerId, index: usize) -> usize {
        let index = index.min(self.choices.len().saturating_sub(1));
        self.indices.lock().insert(player, index);
        index
    }

    /// Cycle forward.
    pub fn next(&self, player: PlayerId) -> usize {
        self.shift(player, 1)
    }

    /// Cycle backward.
    pub fn previous(&self, player: PlayerId) -> usize {
        self.shift(player, self.choices.len().saturating_sub(1))
    }

    fn shift(&self, player: PlayerId, by: usize) -> usize {
        let len = self.choices.len();
        if len == 0 {
            return 0;
        }
        let mut indices = self.indices.lock();
        let current = indices.get(&player).copied().unwrap_or(self.default_index);
        let next = (current + by) % len;
        indices.insert(player, next);
        next
    }

    fn forget(&self, player: PlayerId) {
        self.indices.lock().remove(&player);
    }
}

/// Button whose handler runs off the input thread.
pub struct AsyncButtonState {
    handler: PlayerCallback,
    loading_text: String,
    loading: Mutex<FxHashSet<PlayerId>>,
}

impl AsyncButtonState {
    #[must_use]
    pub fn is_loading(&self, player: PlayerId) -> bool {
        self.loading.lock().contains(&player)
    }

    #[must_use]
    pub fn loading_text(&self) -> &str {
        &self.loading_text
    }

    /// Mark `player` as loading. `false` if already loading.
    fn begin(&self, player: PlayerId) -> bool {
        self.loading.lock().insert(player)
    }

    fn finish(&self, player: PlayerId) {
        self.loading.lock().remove(&player);
    }
}

/// Read-only bar fed by a provider.
pub struct ProgressBarState {
    provider: ProgressProvider,
    bar_width: usize,
    show_percentage: bool,
}

impl ProgressBarState {
    /// Provider output clamped to `0.0..=1.0`. NaN reads as zero.
    #[must_use]
    pub fn progress(&self, player: PlayerId) -> f32 {
        let raw = (self.provider)(player);
        if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
    }
}

/// Where a submenu option leads.
#[derive(Clone)]
pub enum SubmenuTarget {
    Menu(Arc<Menu>),
    Factory(SubmenuFactory),
}

/// Variant payload of an option.
pub enum OptionKind {
    Text { align: TextAlign },
    Button { on_click: Option<PlayerCallback> },
    Toggle(ToggleState),
    Slider(SliderState),
    Choice(ChoiceState),
    Submenu(SubmenuTarget),
    AsyncButton(AsyncButtonState),
    Separator,
    ProgressBar(ProgressBarState),
}

impl OptionKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Button { .. } => "button",
            Self::Toggle(_) => "toggle",
            Self::Slider(_) => "slider",
            Self::Choice(_) => "choice",
            Self::Submenu(_) => "submenu",
            Self::AsyncButton(_) => "async_button",
            Self::Separator => "separator",
            Self::ProgressBar(_) => "progress_bar",
        }
    }

    const fn is_interactive(&self) -> bool {
        !matches!(self, Self::Text { .. } | Self::Separator | Self::ProgressBar(_))
    }
}

/// Work an async button hands to the runtime.
pub struct AsyncJob {
    option: Arc<MenuOption>,
    player: PlayerId,
}

impl AsyncJob {
    #[must_use]
    pub fn option(&self) -> &Arc<MenuOption> {
        &self.option
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Run the handler on the current thread.
    pub fn run(&self) {
        if let OptionKind::AsyncButton(state) = &self.option.kind {
            (state.handler)(self.player);
        }
    }

    /// Clear the loading flag. Idempotent.
    pub fn finish(&self) {
        if let OptionKind::AsyncButton(state) = &self.option.kind {
            state.finish(self.player);
        }
    }
}

impl fmt::Debug for AsyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncJob")
            .field("option", &self.option.id)
            .field("player", &self.player)
            .finish()
    }
}

/// What selecting an option asks the caller to do.
pub enum Activation {
    /// Not interactive, hidden or disabled.
    Ignored,
    /// Validation failed; the failure callback already ran.
    Rejected,
    /// An async handler for this player is still running.
    Busy,
    /// A per-player value changed in place.
    Changed,
    /// A synchronous click handler ran.
    Clicked,
    /// Open this menu as a child.
    OpenSubmenu(Arc<Menu>),
    /// Run this job off the input thread; loading is already set.
    Spawn(AsyncJob),
}

impl Activation {
    /// Whether the option accepted the selection.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored | Self::Rejected | Self::Busy)
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => f.write_str("Ignored"),
            Self::Rejected => f.write_str("Rejected"),
            Self::Busy => f.write_str("Busy"),
            Self::Changed => f.write_str("Changed"),
            Self::Clicked => f.write_str("Clicked"),
            Self::OpenSubmenu(menu) => f.debug_tuple("OpenSubmenu").field(&menu.title()).finish(),
            Self::Spawn(job) => f.debug_tuple("Spawn").field(job).finish(),
        }
    }
}

/// Inputs for rendering one option row.
pub struct OptionRenderContext<'a> {
    pub player: PlayerId,
    pub engine: &'a mut TextEffectEngine,
    /// Advance scrolling labels this frame.
    pub advance: bool,
    pub navigation_prefix: &'a str,
    pub navigation_color: &'a str,
    pub disabled_color: &'a str,
    /// Overflow style for options without their own.
    pub default_style: Option<&'a HorizontalStyle>,
}

/// A selectable (or decorative) row of a menu.
pub struct MenuOption {
    id: OptionId,
    text: RwLock<OptionText>,
    kind: OptionKind,
    visible: AtomicBool,
    visible_when: Option<PlayerPredicate>,
    enabled: AtomicBool,
    enabled_when: Option<PlayerPredicate>,
    text_size: TextSize,
    play_sound: bool,
    horizontal_style: Option<HorizontalStyle>,
    validate: Option<PlayerPredicate>,
    on_validation_failed: Option<PlayerCallback>,
    close_after_select: Option<bool>,
    before_format: Option<BeforeFormat>,
    after_format: Option<AfterFormat>,
}

impl MenuOption {
    fn with_kind(text: OptionText, kind: OptionKind) -> Self {
        let play_sound = kind.is_interactive();
        Self {
            id: OptionId::next(),
            text: RwLock::new(text),
            kind,
            visible: AtomicBool::new(true),
            visible_when: None,
            enabled: AtomicBool::new(true),
            enabled_when: None,
            text_size: TextSize::default(),
            play_sound,
            horizontal_style: None,
            validate: None,
            on_validation_failed: None,
            close_after_select: None,
            before_format: None,
            after_format: None,
        }
    }

    /// Static, non-selectable text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Text {
                align: TextAlign::Left,
            },
        )
    }

    /// Text recomputed for each player on every render.
    #[must_use]
    pub fn dynamic_text(provider: impl Fn(PlayerId) -> String + Send + Sync + 'static) -> Self {
        Self::with_kind(
            OptionText::Dynamic(Arc::new(provider)),
            OptionKind::Text {
                align: TextAlign::Left,
            },
        )
    }

    #[must_use]
    pub fn button(text: impl Into<String>, on_click: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Button {
                on_click: Some(Arc::new(on_click)),
            },
        )
    }

    #[must_use]
    pub fn toggle(text: impl Into<String>, default: bool) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Toggle(ToggleState {
                default,
                values: Mutex::new(FxHashMap::default()),
                on_change: None,
            }),
        )
    }

    /// A slider; a non-positive or oversized `step` is clamped with a warning.
    #[must_use]
    pub fn slider(text: impl Into<String>, min: f32, max: f32, default: f32, step: f32) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Slider(SliderState::new(min, max, default, step)),
        )
    }

    /// A choice list. An empty list is rejected when the menu is built.
    #[must_use]
    pub fn choice<I, S>(text: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Choice(ChoiceState {
                choices: choices.into_iter().map(Into::into).collect(),
                default_index: 0,
                indices: Mutex::new(FxHashMap::default()),
                on_change: None,
            }),
        )
    }

    #[must_use]
    pub fn submenu(text: impl Into<String>, menu: Arc<Menu>) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Submenu(SubmenuTarget::Menu(menu)),
        )
    }

    /// A submenu built on demand for each selection.
    #[must_use]
    pub fn submenu_with(
        text: impl Into<String>,
        factory: impl Fn(PlayerId) -> Arc<Menu> + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::Submenu(SubmenuTarget::Factory(Arc::new(factory))),
        )
    }

    /// A button whose handler may block; it runs on a worker thread.
    #[must_use]
    pub fn async_button(text: impl Into<String>, handler: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::AsyncButton(AsyncButtonState {
                handler: Arc::new(handler),
                loading_text: "Processing...".to_owned(),
                loading: Mutex::new(FxHashSet::default()),
            }),
        )
    }

    #[must_use]
    pub fn separator() -> Self {
        let mut option = Self::with_kind(OptionText::Static(String::new()), OptionKind::Separator);
        option.text_size = TextSize::Small;
        option
    }

    #[must_use]
    pub fn progress_bar(
        text: impl Into<String>,
        provider: impl Fn(PlayerId) -> f32 + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            OptionText::Static(text.into()),
            OptionKind::ProgressBar(ProgressBarState {
                provider: Arc::new(provider),
                bar_width: 10,
                show_percentage: true,
            }),
        )
    }

    // ── Chained setters ─────────────────────────────────────────────

    #[must_use]
    pub fn visible(self, visible: bool) -> Self {
        self.visible.store(visible, Ordering::Relaxed);
        self
    }

    #[must_use]
    pub fn visible_when(mut self, pred: impl Fn(PlayerId) -> bool + Send + Sync + 'static) -> Self {
        self.visible_when = Some(Arc::new(pred));
        self
    }

    #[must_use]
    pub fn enabled(self, enabled: bool) -> Self {
        self.enabled.store(enabled, Ordering::Relaxed);
        self
    }

    #[must_use]
    pub fn enabled_when(mut self, pred: impl Fn(PlayerId) -> bool + Send + Sync + 'static) -> Self {
        self.enabled_when = Some(Arc::new(pred));
        self
    }

    #[must_use]
    pub fn text_size(mut self, size: TextSize) -> Self {
        self.text_size = size;
        self
    }

    #[must_use]
    pub fn play_sound(mut self, play: bool) -> Self {
        self.play_sound = play;
        self
    }

    #[must_use]
    pub fn horizontal_style(mut self, style: HorizontalStyle) -> Self {
        self.horizontal_style = Some(style);
        self
    }

    /// Gate selection on `pred`; `on_fail` runs when it returns false.
    #[must_use]
    pub fn validate(
        mut self,
        pred: impl Fn(PlayerId) -> bool + Send + Sync + 'static,
        on_fail: impl Fn(PlayerId) + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(pred));
        self.on_validation_failed = Some(Arc::new(on_fail));
        self
    }

    #[must_use]
    pub fn close_after_select(mut self, close: bool) -> Self {
        self.close_after_select = Some(close);
        self
    }

    #[must_use]
    pub fn before_format(
        mut self,
        hook: impl Fn(PlayerId, &str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.before_format = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn after_format(mut self, hook: impl Fn(PlayerId, String) -> String + Send + Sync + 'static) -> Self {
        self.after_format = Some(Arc::new(hook));
        self
    }

    /// Alignment of a text option. Ignored by other kinds.
    #[must_use]
    pub fn align(mut self, align: TextAlign) -> Self {
        if let OptionKind::Text { align: current } = &mut self.kind {
            *current = align;
        }
        self
    }

    #[must_use]
    pub fn on_toggle(mut self, handler: impl Fn(PlayerId, bool) + Send + Sync + 'static) -> Self {
        if let OptionKind::Toggle(state) = &mut self.kind {
            state.on_change = Some(Arc::new(handler));
        }
        self
    }

    #[must_use]
    pub fn on_slide(mut self, handler: impl Fn(PlayerId, f32) + Send + Sync + 'static) -> Self {
        if let OptionKind::Slider(state) = &mut self.kind {
            state.on_change = Some(Arc::new(handler));
        }
        self
    }

    #[must_use]
    pub fn on_choice(mut self, handler: impl Fn(PlayerId, usize) + Send + Sync + 'static) -> Self {
        if let OptionKind::Choice(state) = &mut self.kind {
            state.on_change = Some(Arc::new(handler));
        }
        self
    }

    /// Initially selected choice, clamped into range.
    #[must_use]
    pub fn default_choice(mut self, index: usize) -> Self {
        if let OptionKind::Choice(state) = &mut self.kind {
            state.default_index = index.min(state.choices.len().saturating_sub(1));
        }
        self
    }

    #[must_use]
    pub fn loading_text(mut self, text: impl Into<String>) -> Self {
        if let OptionKind::AsyncButton(state) = &mut self.kind {
            state.loading_text = text.into();
        }
        self
    }

    #[must_use]
    pub fn bar_width(mut self, width: usize) -> Self {
        if let OptionKind::ProgressBar(state) = &mut self.kind {
            state.bar_width = width.max(1);
        }
        self
    }

    #[must_use]
    pub fn show_percentage(mut self, show: bool) -> Self {
        if let OptionKind::ProgressBar(state) = &mut self.kind {
            state.show_percentage = show;
        }
        self
    }

    // ── Runtime API ─────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.write() = OptionText::Static(text.into());
    }

    pub fn set_dynamic_text(&self, provider: impl Fn(PlayerId) -> String + Send + Sync + 'static) {
        *self.text.write() = OptionText::Dynamic(Arc::new(provider));
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_visible_for(&self, player: PlayerId) -> bool {
        self.visible.load(Ordering::Relaxed) && self.visible_when.as_ref().is_none_or(|p| p(player))
    }

    /// Enabled flag and predicate; ignores transient loading.
    #[must_use]
    pub fn is_enabled_for(&self, player: PlayerId) -> bool {
        self.enabled.load(Ordering::Relaxed) && self.enabled_when.as_ref().is_none_or(|p| p(player))
    }

    /// Whether the cursor may rest on this option.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !matches!(self.kind, OptionKind::Separator)
    }

    #[must_use]
    pub fn plays_sound(&self) -> bool {
        self.play_sound
    }

    /// Explicit close-after-select choice; `None` defers to the menu.
    #[must_use]
    pub fn closes_after_select(&self) -> Option<bool> {
        self.close_after_select
    }

    #[must_use]
    pub fn as_toggle(&self) -> Option<&ToggleState> {
        match &self.kind {
            OptionKind::Toggle(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_slider(&self) -> Option<&SliderState> {
        match &self.kind {
            OptionKind::Slider(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_choice(&self) -> Option<&ChoiceState> {
        match &self.kind {
            OptionKind::Choice(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_async_button(&self) -> Option<&AsyncButtonState> {
        match &self.kind {
            OptionKind::AsyncButton(state) => Some(state),
            _ => None,
        }
    }

    /// Drop every per-player value held for `player`.
    pub fn forget_player(&self, player: PlayerId) {
        match &self.kind {
            OptionKind::Toggle(state) => state.forget(player),
            OptionKind::Slider(state) => state.forget(player),
            OptionKind::Choice(state) => state.forget(player),
            OptionKind::AsyncButton(state) => state.finish(player),
            _ => {}
        }
    }

    /// Label after the `before_format` hook, before any decoration.
    #[must_use]
    pub fn label_for(&self, player: PlayerId) -> String {
        let text = self.text.read().clone();
        let base = text.resolve(player);
        match &self.before_format {
            Some(hook) => hook(player, &base).unwrap_or(base),
            None => base,
        }
    }

    /// Full row markup for one player.
    pub fn display(&self, ctx: &mut OptionRenderContext<'_>) -> String {
        let player = ctx.player;
        let label = self.label_for(player);
        let style = self.horizontal_style.as_ref().or(ctx.default_style);
        let label = match style {
            Some(style) if !matches!(self.kind, OptionKind::Separator) => ctx
                .engine
                .apply(self.id.0, &label, style, ctx.advance)
                .into_owned(),
            _ => label,
        };

        let body = self.decorate(label, player, ctx);
        let class = self.text_size.css_class();
        let mut row = if self.kind.is_interactive() && !self.is_enabled_for(player) {
            let body = strip_color_attributes(&body);
            format!("<font class='{class}' color='{}'>{body}</font>", ctx.disabled_color)
        } else {
            format!("<font class='{class}'>{body}</font>")
        };
        if let OptionKind::Text { align } = self.kind {
            row = match align {
                TextAlign::Left => row,
                TextAlign::Center => format!("<center>{row}</center>"),
                TextAlign::Right => format!("<div align='right'>{row}</div>"),
            };
        }
        match &self.after_format {
            Some(hook) => hook(player, row),
            None => row,
        }
    }

    fn decorate(&self, label: String, player: PlayerId, ctx: &OptionRenderContext<'_>) -> String {
        let nav = ctx.navigation_color;
        match &self.kind {
            OptionKind::Text { .. } | OptionKind::Button { .. } => label,
            OptionKind::Toggle(state) => {
                let mark = if state.value(player) { TOGGLE_ON } else { TOGGLE_OFF };
                format!("{label}: {mark}")
            }
            OptionKind::Slider(state) => {
                let value = state.value(player);
                let filled = state.filled_bars(value);
                let mut out = format!("{label}: <font color='{nav}'>(</font>");
                push_bar_run(&mut out, nav, "■", filled);
                push_bar_run(&mut out, EMPTY_BAR_COLOR, "□", SLIDER_BARS - filled);
                out.push_str(&format!(
                    "<font color='{CLOSE_ACCENT}'>)</font> <font color='{nav}'>{value:.1}</font>"
                ));
                out
            }
            OptionKind::Choice(state) => {
                let current = state.selected(player).unwrap_or_default();
                format!(
                    "{label}: <font color='{nav}'>[</font>{current}<font color='{CLOSE_ACCENT}'>]</font>"
                )
            }
            OptionKind::Submenu(_) => {
                format!("{label} <font color='{nav}'>{}</font>", ctx.navigation_prefix)
            }
            OptionKind::AsyncButton(state) => {
                if state.is_loading(player) {
                    format!("<font color='{LOADING_COLOR}'>{}</font>", state.loading_text)
                } else {
                    label
                }
            }
            OptionKind::Separator => format!("<font color='{nav}'>{SEPARATOR_RULE}</font>"),
            OptionKind::ProgressBar(state) => {
                let progress = state.progress(player);
                let filled = ((progress * state.bar_width as f32) as usize).min(state.bar_width);
                let mut out = format!("{label}: ");
                push_bar_run(&mut out, nav, "█", filled);
                push_bar_run(&mut out, EMPTY_BAR_COLOR, "░", state.bar_width - filled);
                if state.show_percentage {
                    out.push_str(&format!(" {}%", (progress * 100.0) as u32));
                }
                out
            }
        }
    }

    /// Apply a selection by `player`.
    ///
    /// Value-carrying variants mutate in place and fire their change
    /// handler; buttons run their click handler; submenus and async buttons
    /// hand work back to the caller.
    pub fn activate(self: &Arc<Self>, player: PlayerId) -> Activation {
        if !self.is_visible_for(player) || !self.is_enabled_for(player) || !self.kind.is_interactive() {
            return Activation::Ignored;
        }
        if let OptionKind::AsyncButton(state) = &self.kind {
            if state.is_loading(player) {
                return Activation::Busy;
            }
        }
        if let Some(validate) = &self.validate {
            if !validate(player) {
                tracing::debug!(option = %self.id, %player, "option validation rejected");
                if let Some(on_fail) = &self.on_validation_failed {
                    on_fail(player);
                }
                return Activation::Rejected;
            }
        }

        match &self.kind {
            OptionKind::Button { on_click } => {
                if let Some(on_click) = on_click {
                    on_click(player);
                }
                Activation::Clicked
            }
            OptionKind::Toggle(state) => {
                let value = state.flip(player);
                if let Some(handler) = &state.on_change {
                    handler(player, value);
                }
                Activation::Changed
            }
            OptionKind::Slider(state) => {
                let value = state.advance(player);
                if let Some(handler) = &state.on_change {
                    handler(player, value);
                }
                Activation::Changed
            }
            OptionKind::Choice(state) => {
                let index = state.next(player);
                if let Some(handler) = &state.on_change {
                    handler(player, index);
                }
                Activation::Changed
            }
            OptionKind::Submenu(target) => Activation::OpenSubmenu(match target {
                SubmenuTarget::Menu(menu) => Arc::clone(menu),
                SubmenuTarget::Factory(factory) => factory(player),
            }),
            OptionKind::AsyncButton(state) => {
                if !state.begin(player) {
                    return Activation::Busy;
                }
                Activation::Spawn(AsyncJob {
                    option: Arc::clone(self),
                    player,
                })
            }
            OptionKind::Text { .. } | OptionKind::Separator | OptionKind::ProgressBar(_) => {
                Activation::Ignored
            }
        }
    }
}

fn push_bar_run(out: &mut String, color: &str, glyph: &str, count: usize) {
    if count == 0 {
        return;
    }
    out.push_str("<font color='");
    out.push_str(color);
    out.push_str("'>");
    for _ in 0..count {
        out.push_str(glyph);
    }
    out.push_str("</font>");
}

impl fmt::Debug for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &*self.text.read() {
            OptionText::Static(text) => text.clone(),
            OptionText::Dynamic(_) => "<dynamic>".to_owned(),
        };
        f.debug_struct("MenuOption")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("label", &label)
            .finish_non_exhaustive()
    }
}
