//! The shared, lock-guarded progress tracker.
//!
//! A [`ProgressTracker`] owns every piece of mutable state (value, total,
//! width, prefix, numeric format, sink, completion callback) behind a single
//! [`Mutex`](parking_lot::Mutex). Every operation takes the lock for its full
//! duration, including the write to the sink and the callback, so renders are
//! totally ordered and a rendered line always reflects one consistent state.
//!
//! # Defaults
//!
//! Unset or invalid fields are never rejected. They are replaced by a default
//! at render time, every render, so a later correction takes effect on the
//! next line:
//!
//! | field  | default when                 | default         |
//! |--------|------------------------------|-----------------|
//! | total  | `<= 0` or NaN                | `100`           |
//! | width  | `0`                          | `24`            |
//! | format | empty or unparseable         | `%1.0f`         |
//! | sink   | none set                     | standard output |

use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, OnceLock},
    time::Duration,
};

use compact_str::CompactString;
use parking_lot::Mutex;
use web_time::Instant;

use crate::{
    format::NumberFormat,
    render::{self, Line},
};

/// Total used when the configured total is not positive.
pub const DEFAULT_TOTAL: f64 = 100.0;

/// Bar width used when the configured width is zero.
pub const DEFAULT_WIDTH: usize = 24;

/// Destination for rendered lines.
pub type Sink = Box<dyn Write + Send + 'static>;

/// Hook invoked when a render finds `value >= total`.
pub type CompletionCallback = Box<dyn FnMut() + Send + 'static>;

/// When the completion callback fires.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompletionMode {
    /// On every render where the task is complete, including repeated
    /// [`complete`](ProgressTracker::complete) calls.
    #[default]
    EveryRender,
    /// Only on the first render where the task is complete.
    Once,
}

/// A thread-safe, cloneable single-line progress indicator.
///
/// Cloning is cheap (Arc bump); all clones drive the same line.
///
/// ```
/// use progress_line::ProgressTracker;
///
/// let tracker = ProgressTracker::builder()
///     .with_total(4.0)
///     .with_prefix("copy ")
///     .with_sink(std::io::sink())
///     .build();
///
/// for _ in 0..3 {
///     tracker.increment();
/// }
/// assert!(!tracker.is_complete());
///
/// tracker.complete();
/// assert!(tracker.is_complete());
/// ```
#[derive(Clone)]
pub struct ProgressTracker {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) state: Mutex<State>,
    pub(crate) start: OnceLock<Instant>,
}

/// Raw, unresolved settings. Effective values are derived per render.
pub(crate) struct State {
    pub(crate) total: f64,
    pub(crate) value: f64,
    pub(crate) width: usize,
    pub(crate) prefix: CompactString,
    pub(crate) format: Option<NumberFormat>,
    pub(crate) sink: Option<Sink>,
    pub(crate) on_complete: Option<CompletionCallback>,
    pub(crate) completion: CompletionMode,
    pub(crate) fired: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            total: 0.0,
            value: 0.0,
            width: 0,
            prefix: CompactString::default(),
            format: None,
            sink: None,
            on_complete: None,
            completion: CompletionMode::default(),
            fired: false,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::from_parts(State::default(), None)
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ProgressTracker")
            .field("value", &state.value)
            .field("total", &state.total)
            .field("width", &state.width)
            .field("prefix", &state.prefix)
            .field("format", &state.format.as_ref().map(NumberFormat::as_str))
            .field("has_sink", &state.sink.is_some())
            .field("has_on_complete", &state.on_complete.is_some())
            .field("completion", &state.completion)
            .finish_non_exhaustive()
    }
}

impl ProgressTracker {
    /// Creates a tracker with every field at its default, writing to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with the given total, writing to stdout.
    #[must_use]
    pub fn with_total(total: f64) -> Self {
        Self::from_parts(
            State {
                total,
                ..State::default()
            },
            None,
        )
    }

    /// Starts a [`ProgressBuilder`](crate::ProgressBuilder).
    #[must_use]
    pub fn builder() -> crate::ProgressBuilder {
        crate::ProgressBuilder::new()
    }

    pub(crate) fn from_parts(state: State, start: Option<Instant>) -> Self {
        let cell = OnceLock::new();
        if let Some(start) = start {
            let _ = cell.set(start);
        }
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                start: cell,
            }),
        }
    }

    // ========================================================================
    // Setters (no render)
    // ========================================================================

    /// Sets the bar width in glyphs. `0` falls back to the default width.
    pub fn set_width(&self, width: usize) {
        self.inner.state.lock().width = width;
    }

    /// Sets the label printed at the start of every line.
    pub fn set_prefix(&self, prefix: impl Into<CompactString>) {
        self.inner.state.lock().prefix = prefix.into();
    }

    /// Sets the numeric template for value and total, e.g. `"%0.3f"`.
    ///
    /// An empty or unparseable template falls back to the default `%1.0f`;
    /// the latter is logged at warn level.
    pub fn set_format(&self, format: &str) {
        let format = parse_format(format);
        self.inner.state.lock().format = format;
    }

    /// Redirects subsequent renders to `sink`.
    pub fn set_sink(&self, sink: impl Write + Send + 'static) {
        self.inner.state.lock().sink = Some(Box::new(sink));
    }

    /// Reverts to writing on standard output.
    pub fn clear_sink(&self) {
        self.inner.state.lock().sink = None;
    }

    /// Registers the completion callback, replacing any previous one.
    ///
    /// The callback runs on the thread that triggered the render, while the
    /// tracker lock is held; it must not call back into this tracker.
    pub fn set_on_complete(&self, callback: impl FnMut() + Send + 'static) {
        let mut state = self.inner.state.lock();
        state.on_complete = Some(Box::new(callback));
        state.fired = false;
    }

    /// Removes the completion callback.
    pub fn clear_on_complete(&self) {
        self.inner.state.lock().on_complete = None;
    }

    /// Chooses whether the completion callback fires on every completed
    /// render or only the first.
    pub fn set_completion_mode(&self, mode: CompletionMode) {
        self.inner.state.lock().completion = mode;
    }

    // ========================================================================
    // Mutations (render)
    // ========================================================================

    /// Sets the total and renders.
    pub fn set_total(&self, total: f64) {
        let mut state = self.inner.state.lock();
        state.total = total;
        state.render(&self.inner.start);
    }

    /// Sets the current value and renders.
    pub fn set_value(&self, value: f64) {
        let mut state = self.inner.state.lock();
        state.value = value;
        state.render(&self.inner.start);
    }

    /// Adds one to the value and renders.
    pub fn increment(&self) {
        self.advance(1.0);
    }

    /// Alias of [`increment`](Self::increment).
    pub fn increment_value(&self) {
        self.increment();
    }

    /// Adds `delta` to the value and renders.
    pub fn advance(&self, delta: f64) {
        let mut state = self.inner.state.lock();
        state.value += delta;
        state.render(&self.inner.start);
    }

    /// Adds one to the total and renders.
    ///
    /// Useful when the amount of work is discovered while it is being done.
    pub fn increment_total(&self) {
        let mut state = self.inner.state.lock();
        state.total += 1.0;
        state.render(&self.inner.start);
    }

    /// Sets the value to the effective total and renders a 100% line.
    pub fn complete(&self) {
        let mut state = self.inner.state.lock();
        state.value = state.effective_total();
        state.render(&self.inner.start);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.inner.state.lock().value
    }

    /// The total as configured, which may be non-positive.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.inner.state.lock().total
    }

    /// The total used for rendering.
    #[must_use]
    pub fn effective_total(&self) -> f64 {
        self.inner.state.lock().effective_total()
    }

    /// The completion ratio, clamped to `1.0`.
    #[must_use]
    pub fn rate(&self) -> f64 {
        let state = self.inner.state.lock();
        render::rate(state.value, state.effective_total())
    }

    /// Whether `value >= effective total`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let state = self.inner.state.lock();
        state.value >= state.effective_total()
    }

    /// Time since the first render, or `None` if nothing was rendered yet.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.inner.start.get().map(Instant::elapsed)
    }

    /// Takes a consistent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.into()
    }
}

pub(crate) fn parse_format(format: &str) -> Option<NumberFormat> {
    if format.is_empty() {
        return None;
    }
    match NumberFormat::parse(format) {
        Ok(format) => Some(format),
        Err(err) => {
            tracing::warn!(%err, "ignoring progress format template");
            None
        }
    }
}

impl State {
    pub(crate) fn effective_total(&self) -> f64 {
        if self.total > 0.0 {
            self.total
        } else {
            DEFAULT_TOTAL
        }
    }

    pub(crate) fn effective_width(&self) -> usize {
        if self.width > 0 {
            self.width
        } else {
            DEFAULT_WIDTH
        }
    }

    fn render(&mut self, start: &OnceLock<Instant>) {
        let start = *start.get_or_init(|| {
            tracing::debug!(prefix = %self.prefix, "progress started");
            Instant::now()
        });

        let total = self.effective_total();
        let default_format;
        let format = match &self.format {
            Some(format) => format,
            None => {
                default_format = NumberFormat::default();
                &default_format
            }
        };

        let line = render::render_line(&Line {
            prefix: &self.prefix,
            value: self.value,
            total,
            width: self.effective_width(),
            format,
            elapsed: start.elapsed(),
        });
        tracing::trace!(value = self.value, total, "render progress");

        if let Err(err) = self.write_line(&line) {
            tracing::warn!(%err, "failed to write progress line");
        }

        if self.value >= total {
            self.notify_complete();
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => {
                sink.write_all(line.as_bytes())?;
                sink.flush()
            }
            None => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
        }
    }

    fn notify_complete(&mut self) {
        if self.completion == CompletionMode::Once && self.fired {
            return;
        }
        if let Some(callback) = self.on_complete.as_mut() {
            self.fired = true;
            callback();
        }
    }
}

/// A plain-data copy of a [`ProgressTracker`] at one instant, with defaults
/// already applied.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    prefix: CompactString,
    format: CompactString,
    value: f64,
    total: f64,
    width: usize,
    elapsed: Option<Duration>,
}

impl From<&ProgressTracker> for ProgressSnapshot {
    fn from(tracker: &ProgressTracker) -> Self {
        let state = tracker.inner.state.lock();
        Self {
            prefix: state.prefix.clone(),
            format: state
                .format
                .as_ref()
                .map_or_else(|| crate::format::DEFAULT_FORMAT.into(), |f| f.as_str().into()),
            value: state.value,
            total: state.effective_total(),
            width: state.effective_width(),
            elapsed: tracker.elapsed(),
        }
    }
}

impl ProgressSnapshot {
    /// The label printed before the percentage.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The numeric template in effect.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The current value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// The effective total.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// The effective bar width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Time since the first render, `None` before it.
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// The completion ratio, clamped to `1.0`.
    #[must_use]
    pub fn rate(&self) -> f64 {
        render::rate(self.value, self.total)
    }

    /// The completion percentage, `0.0..=100.0` for non-negative values.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.rate() * 100.0
    }

    /// Whether the value has reached the total.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.value >= self.total
    }

    /// Estimated time remaining, from the average speed so far.
    ///
    /// Returns `None` before the first render, with no progress, or when
    /// complete.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.value <= 0.0 || self.is_complete() {
            return None;
        }
        let secs = self.elapsed?.as_secs_f64();
        if secs <= 1e-6 {
            return None;
        }
        let remaining = (self.total - self.value) / (self.value / secs);
        Duration::try_from_secs_f64(remaining).ok()
    }
}
