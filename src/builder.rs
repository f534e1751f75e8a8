//! Fluent interface for constructing [`ProgressTracker`] instances.
//!
//! Every field of a tracker is optional. [`ProgressTracker::new`] covers the
//! all-defaults case; the [`ProgressBuilder`] lets callers pre-set any subset
//! of total, value, width, prefix, format, sink and completion behavior
//! before the first render.
//!
//! # Key Features
//!
//! * **Configuration files:** [`ProgressBuilder::from_config`] applies a
//!   [`ProgressConfig`], which can be deserialized with the `serde` feature.
//! * **Time Travel:** Allows explicitly setting the start time, useful for
//!   resuming a task whose elapsed time should include earlier work.

use std::io::Write;

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    config::ProgressConfig,
    progress::{CompletionCallback, CompletionMode, ProgressTracker, Sink, State, parse_format},
};

/// A builder pattern for constructing [`ProgressTracker`] instances.
///
/// Building never renders; the first line appears on the first value or
/// total mutation.
#[derive(Default)]
pub struct ProgressBuilder {
    total: f64,
    value: f64,
    width: usize,
    prefix: CompactString,
    format: CompactString,
    sink: Option<Sink>,
    on_complete: Option<CompletionCallback>,
    completion: CompletionMode,
    start: Option<Instant>,
}

impl ProgressBuilder {
    /// Starts a builder with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder from plain configuration.
    #[must_use]
    pub fn from_config(config: ProgressConfig) -> Self {
        Self {
            total: config.total,
            width: config.width,
            prefix: config.prefix,
            format: config.format,
            completion: config.completion,
            ..Self::default()
        }
    }

    /// Sets the target total. Non-positive totals render as `100`.
    #[must_use]
    pub const fn with_total(mut self, total: f64) -> Self {
        self.total = total;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub const fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Sets the bar width in glyphs. `0` renders as `24`.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the label printed at the start of every line.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<CompactString>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the numeric template, e.g. `"%0.3f"`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<CompactString>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the output sink. Without one, lines go to standard output.
    #[must_use]
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn with_on_complete(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Sets when the completion callback fires.
    #[must_use]
    pub const fn with_completion_mode(mut self, mode: CompletionMode) -> Self {
        self.completion = mode;
        self
    }

    /// Sets the start time explicitly instead of capturing it on the first
    /// render.
    #[must_use]
    pub const fn with_start_time(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the start time to `Instant::now()`.
    #[must_use]
    pub fn with_start_time_now(self) -> Self {
        self.with_start_time(Instant::now())
    }

    /// Consumes the builder and returns the tracker.
    #[must_use]
    pub fn build(self) -> ProgressTracker {
        ProgressTracker::from_parts(
            State {
                total: self.total,
                value: self.value,
                width: self.width,
                prefix: self.prefix,
                format: parse_format(&self.format),
                sink: self.sink,
                on_complete: self.on_complete,
                completion: self.completion,
                fired: false,
            },
            self.start,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use web_time::Instant;

    use super::ProgressBuilder;
    use crate::{
        config::ProgressConfig,
        progress::CompletionMode,
        testing::{SharedBuffer, fields},
    };

    /// Pre-set Fields
    /// Everything set on the builder shows up in the first render.
    #[test]
    fn test_build_with_fields() {
        let buf = SharedBuffer::default();
        let p = ProgressBuilder::new()
            .with_total(101.0)
            .with_value(2.0)
            .with_width(8)
            .with_prefix("sync ")
            .with_format("%0.1f")
            .with_sink(buf.clone())
            .build();
        assert!(buf.contents().is_empty(), "building must not render");

        p.increment();
        let out = buf.contents();
        assert!(out.starts_with("\rsync   3.0% [........]"), "{out:?}");
        assert_eq!(fields(&out)[3], "3.0/101.0");
    }

    #[test]
    fn test_from_config() {
        let buf = SharedBuffer::default();
        let config = ProgressConfig {
            total: 10.0,
            width: 4,
            prefix: "cfg ".into(),
            format: "%0.2f".into(),
            completion: CompletionMode::Once,
        };
        let p = ProgressBuilder::from_config(config).with_sink(buf.clone()).build();
        p.set_value(5.0);
        let out = buf.contents();
        assert!(out.starts_with("\rcfg  50.0% [##..] [5.00/10.00 in "), "{out:?}");
    }

    /// Time Travel
    /// An explicit start time is kept instead of the first-render instant.
    #[test]
    fn test_with_start_time() {
        let start = Instant::now().checked_sub(Duration::from_secs(90)).unwrap();
        let buf = SharedBuffer::default();
        let p = ProgressBuilder::new()
            .with_start_time(start)
            .with_sink(buf.clone())
            .build();
        assert!(p.elapsed().unwrap() >= Duration::from_secs(90));

        p.set_value(1.0);
        let out = buf.contents();
        assert!(fields(&out)[4].starts_with("1m30"), "{out:?}");
    }
}
