//! Byte-counting pass-through streams.
//!
//! [`ProgressReader`] and [`ProgressWriter`] sit between a caller and any
//! [`std::io::Read`] or [`std::io::Write`], e.g. for a download or a copy.
//!
//! Every byte count reported by the inner reader or writer is passed to
//! [`ProgressTracker::advance`], which renders a line. Put a
//! [`BufReader`](std::io::BufReader)/[`BufWriter`](std::io::BufWriter) around
//! the wrapper if per-call renders are too frequent.

use std::io::{self, Read, Write};

use crate::ProgressTracker;

/// A wrapper around [`Read`] that advances a [`ProgressTracker`] by the bytes read.
pub struct ProgressReader<R> {
    inner: R,
    tracker: ProgressTracker,
}

impl<R> ProgressReader<R> {
    /// Creates a new `ProgressReader` wrapping `inner`.
    pub const fn new(inner: R, tracker: ProgressTracker) -> Self {
        Self { inner, tracker }
    }

    /// Unwraps the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ProgressReader<R> {
    #[allow(clippy::cast_precision_loss)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.tracker.advance(n as f64);
        }
        Ok(n)
    }
}

/// A wrapper around [`Write`] that advances a [`ProgressTracker`] by the bytes written.
pub struct ProgressWriter<W> {
    inner: W,
    tracker: ProgressTracker,
}

impl<W> ProgressWriter<W> {
    /// Creates a new `ProgressWriter` wrapping `inner`.
    pub const fn new(inner: W, tracker: ProgressTracker) -> Self {
        Self { inner, tracker }
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    #[allow(clippy::cast_precision_loss)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.tracker.advance(n as f64);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
